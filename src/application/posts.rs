//! Post use cases: listing, reading with view counting, and owner-guarded writes.

use std::sync::Arc;

use metrics::counter;
use tracing::info;

use crate::application::access::{self, Principal};
use crate::application::error::ServiceError;
use crate::application::pagination::{OffsetPage, PageWindow, normalize_limit, normalize_page};
use crate::application::repos::{CreatePostParams, PostsRepo, PostsWriteRepo, UpdatePostParams};
use crate::domain::entities::PostRecord;
use crate::domain::posts::{ensure_content, normalize_content, normalize_title};

pub const METRIC_POST_VIEWS: &str = "postboard_post_views_total";

const SOURCE: &str = "application::posts::PostService";

#[derive(Debug, Clone)]
pub struct CreatePostCommand {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct UpdatePostCommand {
    pub id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Clone)]
pub struct PostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
}

impl PostService {
    pub fn new(reader: Arc<dyn PostsRepo>, writer: Arc<dyn PostsWriteRepo>) -> Self {
        Self { reader, writer }
    }

    /// Create a post authored by the requester.
    pub async fn create(
        &self,
        requester: Option<&Principal>,
        command: CreatePostCommand,
    ) -> Result<PostRecord, ServiceError> {
        let author = access::require_authenticated(requester)?;
        let title = normalize_title(&command.title)?;
        ensure_content(&command.content)?;

        let post = self
            .writer
            .create_post(CreatePostParams {
                user_id: author.user_id,
                title,
                content: command.content,
            })
            .await?;

        info!(
            target = SOURCE,
            post_id = post.id,
            user_id = author.user_id,
            "post created"
        );
        Ok(post)
    }

    /// One page of posts, newest first.
    pub async fn list(&self, page: i64, limit: i64) -> Result<OffsetPage<PostRecord>, ServiceError> {
        let page = normalize_page(page)?;
        let limit = normalize_limit(limit)?;

        let total_count = self.reader.count_posts().await?;
        let window = PageWindow::resolve(page, limit, total_count);
        let items = self
            .reader
            .list_posts(window.offset(), window.limit)
            .await?;

        Ok(OffsetPage::new(window, items))
    }

    /// Read a post, counting the read as a view.
    pub async fn get(&self, id: i64) -> Result<PostRecord, ServiceError> {
        let post = self
            .writer
            .increase_view_count(id)
            .await?
            .ok_or_else(|| post_not_found(id))?;

        counter!(METRIC_POST_VIEWS).increment(1);
        Ok(post)
    }

    pub async fn update(
        &self,
        requester: Option<&Principal>,
        command: UpdatePostCommand,
    ) -> Result<PostRecord, ServiceError> {
        let actor = self.authorize_owner(requester, command.id).await?;
        let title = normalize_title(&command.title)?;
        let content = normalize_content(&command.content)?;

        let post = self
            .writer
            .update_post(UpdatePostParams {
                id: command.id,
                title,
                content,
            })
            .await?
            .ok_or_else(|| post_not_found(command.id))?;

        info!(
            target = SOURCE,
            post_id = post.id,
            user_id = actor.user_id,
            "post updated"
        );
        Ok(post)
    }

    pub async fn delete(&self, requester: Option<&Principal>, id: i64) -> Result<(), ServiceError> {
        let actor = self.authorize_owner(requester, id).await?;

        if self.writer.delete_post(id).await? == 0 {
            return Err(post_not_found(id));
        }

        info!(target = SOURCE, post_id = id, user_id = actor.user_id, "post deleted");
        Ok(())
    }

    /// Admins skip the ownership lookup; a non-admin asking about a missing
    /// post is not its owner and therefore forbidden.
    async fn authorize_owner<'a>(
        &self,
        requester: Option<&'a Principal>,
        post_id: i64,
    ) -> Result<&'a Principal, ServiceError> {
        let principal = access::require_authenticated(requester)?;
        if principal.is_admin() {
            return Ok(principal);
        }
        let owner = access::is_owner(self.reader.as_ref(), post_id, requester).await?;
        access::authorize(requester, owner)
    }
}

fn post_not_found(id: i64) -> ServiceError {
    ServiceError::not_found(format!("post not found. id={id}"))
}
