//! The ledger program.
//!
//! Every mutation is checked and turned into a [`WriteSet`] here, against a
//! read-only view of current state. Backends hold their write lock while
//! calling in, then commit the write set as one unit. Nothing in this module
//! performs I/O of its own.

use threadlog_core::address::{
    comment_page_address, user_comment_likes_address, user_follow_address, user_like_address,
    user_profile_address,
};
use threadlog_core::pager;
use threadlog_core::{
    derive_address, Address, BitmapError, Comment, CommentPage, Instruction, LedgerError,
    LedgerResult, LikeBitmap, ParentRef, Post, ProgramError, Record, RecordKind, UserCommentLikes,
    UserFollow, UserId, UserLike, UserProfile, MAX_COMMENT_LEN, MAX_POST_CONTENT_LEN,
    MAX_TOPIC_LEN,
};

/// Read access to committed ledger state.
pub trait LedgerRead {
    /// Record at `address`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn read(&self, address: &Address) -> LedgerResult<Option<Record>>;
}

impl LedgerRead for std::collections::HashMap<Address, Record> {
    fn read(&self, address: &Address) -> LedgerResult<Option<Record>> {
        Ok(self.get(address).cloned())
    }
}

/// Records to commit together. Each address appears at most once.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSet {
    writes: Vec<(Address, Record)>,
}

impl WriteSet {
    fn put(&mut self, address: Address, record: Record) {
        match self.writes.iter_mut().find(|(a, _)| *a == address) {
            Some(slot) => slot.1 = record,
            None => self.writes.push((address, record)),
        }
    }

    fn get(&self, address: &Address) -> Option<&Record> {
        self.writes
            .iter()
            .find(|(a, _)| a == address)
            .map(|(_, record)| record)
    }

    /// Number of records written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether nothing is written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Iterate over the writes in the order they were staged.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Record)> {
        self.writes.iter().map(|(address, record)| (address, record))
    }

    /// Consume the write set.
    #[must_use]
    pub fn into_writes(self) -> Vec<(Address, Record)> {
        self.writes
    }
}

/// State view that sees staged writes before committed ones.
struct Staged<'a, S: ?Sized> {
    base: &'a S,
    writes: WriteSet,
}

impl<'a, S: LedgerRead + ?Sized> Staged<'a, S> {
    fn new(base: &'a S) -> Self {
        Self {
            base,
            writes: WriteSet::default(),
        }
    }

    fn get(&self, address: &Address) -> LedgerResult<Option<Record>> {
        match self.writes.get(address) {
            Some(record) => Ok(Some(record.clone())),
            None => self.base.read(address),
        }
    }

    fn exists(&self, address: &Address) -> LedgerResult<bool> {
        Ok(self.get(address)?.is_some())
    }

    fn put(&mut self, address: Address, record: impl Into<Record>) {
        self.writes.put(address, record.into());
    }

    fn post(&self, address: &Address) -> LedgerResult<Post> {
        match self.get(address)? {
            Some(Record::Post(post)) => Ok(post),
            Some(_) => Err(ProgramError::RecordKindMismatch.into()),
            None => Err(ProgramError::PostNotFound.into()),
        }
    }

    fn comment_page(&self, address: &Address) -> LedgerResult<Option<CommentPage>> {
        match self.get(address)? {
            Some(Record::CommentPage(page)) => Ok(Some(page)),
            Some(_) => Err(ProgramError::RecordKindMismatch.into()),
            None => Ok(None),
        }
    }

    fn comment_likes(&self, address: &Address) -> LedgerResult<Option<UserCommentLikes>> {
        match self.get(address)? {
            Some(Record::UserCommentLikes(likes)) => Ok(Some(likes)),
            Some(_) => Err(ProgramError::RecordKindMismatch.into()),
            None => Ok(None),
        }
    }

    /// Apply `bump` to `owner`'s profile if they have one.
    fn bump_profile(&mut self, owner: &UserId, bump: impl FnOnce(&mut UserProfile)) -> LedgerResult<()> {
        let address = user_profile_address(owner);
        match self.get(&address)? {
            Some(Record::UserProfile(mut profile)) => {
                bump(&mut profile);
                self.put(address, profile);
                Ok(())
            }
            Some(_) => Err(ProgramError::RecordKindMismatch.into()),
            None => Ok(()),
        }
    }
}

/// Check a signed instruction and compute its writes.
///
/// # Errors
///
/// Returns [`LedgerError::Rejected`] when the program refuses the instruction,
/// or the read error if state cannot be loaded.
pub fn execute<S: LedgerRead + ?Sized>(
    state: &S,
    instruction: &Instruction,
    signer: &UserId,
    now: i64,
) -> LedgerResult<WriteSet> {
    let mut tx = Staged::new(state);

    match instruction {
        Instruction::CreatePost {
            post,
            topic,
            content,
        } => create_post(&mut tx, post, topic, content, signer, now)?,
        Instruction::AddComment {
            post,
            page_index,
            global_index,
            content,
            parent_index,
        } => add_comment(
            &mut tx,
            post,
            (*page_index, *global_index),
            content,
            *parent_index,
            signer,
            now,
        )?,
        Instruction::LikePost { post } => like_post(&mut tx, post, signer)?,
        Instruction::LikeComment { post, global_index } => {
            like_comment(&mut tx, post, *global_index, signer)?;
        }
        Instruction::TipPost { post, amount } => tip_post(&mut tx, post, *amount)?,
        Instruction::FollowUser { target } => follow_user(&mut tx, target, signer, now)?,
        Instruction::CreateProfile => create_profile(&mut tx, signer)?,
    }

    Ok(tx.writes)
}

/// Check a conditional creation and compute its writes.
///
/// Only comment pages are created this way; other records come from
/// instructions so their counters stay consistent.
///
/// # Errors
///
/// - [`LedgerError::AlreadyExists`] if `address` is occupied.
/// - [`LedgerError::Rejected`] for a bad address, kind or page index.
pub fn create_and_append<S: LedgerRead + ?Sized>(
    state: &S,
    kind: RecordKind,
    address: &Address,
    seeds: &[Vec<u8>],
    record: Record,
) -> LedgerResult<WriteSet> {
    let derived = derive_address(kind, seeds).map_err(|_| ProgramError::AddressMismatch)?;
    if derived != *address {
        return Err(ProgramError::AddressMismatch.into());
    }
    if record.kind() != kind {
        return Err(ProgramError::RecordKindMismatch.into());
    }

    let mut tx = Staged::new(state);
    if tx.exists(address)? {
        return Err(LedgerError::AlreadyExists { address: *address });
    }

    let Record::CommentPage(page) = record else {
        return Err(ProgramError::RecordKindMismatch.into());
    };
    if comment_page_address(&page.post, page.page_index) != *address {
        return Err(ProgramError::AddressMismatch.into());
    }

    let mut post = tx.post(&page.post)?;
    if page.page_index != pager::target_page(post.comment_count) {
        return Err(ProgramError::StalePage.into());
    }

    post.last_comment_page = Some(*address);
    // Pages always start empty.
    tx.put(*address, CommentPage::new(page.post, page.page_index));
    tx.put(page.post, post);

    Ok(tx.writes)
}

fn create_post<S: LedgerRead + ?Sized>(
    tx: &mut Staged<'_, S>,
    address: &Address,
    topic: &str,
    content: &str,
    signer: &UserId,
    now: i64,
) -> LedgerResult<()> {
    if topic.len() > MAX_TOPIC_LEN {
        return Err(ProgramError::TopicTooLong.into());
    }
    check_content(content, MAX_POST_CONTENT_LEN)?;
    if tx.exists(address)? {
        return Err(ProgramError::AccountInUse.into());
    }

    tx.put(
        *address,
        Post {
            author: *signer,
            timestamp: now,
            topic: topic.to_string(),
            content: content.to_string(),
            comment_count: 0,
            last_comment_page: None,
        },
    );
    tx.bump_profile(signer, |profile| {
        profile.post_count = profile.post_count.saturating_add(1);
    })
}

fn add_comment<S: LedgerRead + ?Sized>(
    tx: &mut Staged<'_, S>,
    post_address: &Address,
    (page_index, global_index): (u64, u64),
    content: &str,
    parent: ParentRef,
    signer: &UserId,
    now: i64,
) -> LedgerResult<()> {
    check_content(content, MAX_COMMENT_LEN)?;

    let mut post = tx.post(post_address)?;
    if page_index != pager::target_page(post.comment_count) {
        return Err(ProgramError::StalePage.into());
    }
    // Another append landed since the client read the count.
    if global_index != post.comment_count {
        return Err(ProgramError::StalePage.into());
    }
    if let ParentRef::Parent(index) = parent {
        if index >= post.comment_count {
            return Err(ProgramError::InvalidParent.into());
        }
    }

    // The page for the current count must have been created first.
    let page_address = comment_page_address(post_address, page_index);
    let mut page = tx
        .comment_page(&page_address)?
        .ok_or(ProgramError::StalePage)?;
    page.push(Comment {
        author: *signer,
        timestamp: now,
        parent,
        content: content.to_string(),
        like_count: 0,
    })
    .map_err(|_| ProgramError::PageFull)?;

    post.comment_count = post.comment_count.saturating_add(1);
    tx.put(page_address, page);
    tx.put(*post_address, post);
    Ok(())
}

fn like_post<S: LedgerRead + ?Sized>(
    tx: &mut Staged<'_, S>,
    post_address: &Address,
    signer: &UserId,
) -> LedgerResult<()> {
    let post = tx.post(post_address)?;
    let like_address = user_like_address(signer, post_address);
    if tx.exists(&like_address)? {
        return Err(ProgramError::AlreadyLiked.into());
    }

    tx.put(
        like_address,
        UserLike {
            user: *signer,
            post: *post_address,
        },
    );
    tx.bump_profile(&post.author, |profile| {
        profile.like_count = profile.like_count.saturating_add(1);
    })
}

fn like_comment<S: LedgerRead + ?Sized>(
    tx: &mut Staged<'_, S>,
    post_address: &Address,
    global_index: u64,
    signer: &UserId,
) -> LedgerResult<()> {
    let post = tx.post(post_address)?;
    if !LikeBitmap::in_capacity(global_index) {
        return Err(ProgramError::CommentIndexOutOfBounds.into());
    }
    if global_index >= post.comment_count {
        return Err(ProgramError::CommentNotFound.into());
    }

    let likes_address = user_comment_likes_address(signer, post_address);
    let mut likes = tx.comment_likes(&likes_address)?.unwrap_or(UserCommentLikes {
        user: *signer,
        post: *post_address,
        likes_bitmap: LikeBitmap::new(),
    });
    likes.likes_bitmap.set(global_index).map_err(|e| match e {
        BitmapError::AlreadyLiked { .. } => ProgramError::AlreadyLiked,
        BitmapError::Capacity(_) => ProgramError::CommentIndexOutOfBounds,
    })?;

    let (page_index, _) = pager::locate(global_index);
    let page_address = comment_page_address(post_address, page_index);
    let mut page = tx
        .comment_page(&page_address)?
        .ok_or(ProgramError::CommentNotFound)?;
    let comment = page
        .get_mut(global_index)
        .ok_or(ProgramError::CommentNotFound)?;
    comment.like_count = comment.like_count.saturating_add(1);
    let comment_author = comment.author;

    tx.put(likes_address, likes);
    tx.put(page_address, page);
    tx.bump_profile(&comment_author, |profile| {
        profile.like_count = profile.like_count.saturating_add(1);
    })
}

fn tip_post<S: LedgerRead + ?Sized>(
    tx: &mut Staged<'_, S>,
    post_address: &Address,
    amount: u64,
) -> LedgerResult<()> {
    if amount == 0 {
        return Err(ProgramError::ZeroTip.into());
    }
    let post = tx.post(post_address)?;
    tx.bump_profile(&post.author, |profile| {
        profile.tip_count = profile.tip_count.saturating_add(amount);
    })
}

fn follow_user<S: LedgerRead + ?Sized>(
    tx: &mut Staged<'_, S>,
    target: &UserId,
    signer: &UserId,
    now: i64,
) -> LedgerResult<()> {
    if target == signer {
        return Err(ProgramError::SelfFollow.into());
    }
    let address = user_follow_address(signer, target);
    if tx.exists(&address)? {
        return Err(ProgramError::AlreadyFollowing.into());
    }

    tx.put(
        address,
        UserFollow {
            follower: *signer,
            target: *target,
            timestamp: now,
        },
    );
    Ok(())
}

fn create_profile<S: LedgerRead + ?Sized>(tx: &mut Staged<'_, S>, signer: &UserId) -> LedgerResult<()> {
    let address = user_profile_address(signer);
    if tx.exists(&address)? {
        return Err(ProgramError::AccountInUse.into());
    }
    tx.put(address, UserProfile::new(*signer));
    Ok(())
}

fn check_content(content: &str, max: usize) -> Result<(), ProgramError> {
    if content.is_empty() {
        return Err(ProgramError::EmptyContent);
    }
    if content.len() > max {
        return Err(ProgramError::ContentTooLong);
    }
    Ok(())
}
