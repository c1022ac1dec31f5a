mod read;
mod types;
mod write;

/// Column list shared by every query returning a full post row.
const POST_COLUMNS: &str =
    "id, user_id, title, content, view_count, comments_cnt, created_at, updated_at";
