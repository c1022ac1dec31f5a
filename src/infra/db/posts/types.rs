use time::OffsetDateTime;

use crate::domain::entities::PostRecord;

#[derive(sqlx::FromRow)]
pub(crate) struct PostRow {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) view_count: i64,
    pub(crate) comments_cnt: i64,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            content: row.content,
            view_count: row.view_count,
            comment_count: row.comments_cnt,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
