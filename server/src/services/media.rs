//! Image blobs for recipe pictures and avatars, stored in `media_files`.

use diesel::prelude::*;
use foodgram_core::DecodedImage;

use crate::models::{MediaFile, NewMediaFile};
use crate::schema::media_files;

/// Path prefix media is served under.
pub const MEDIA_PATH: &str = "/media";

/// Store a decoded image under a fresh unique name and return the name.
pub fn store(conn: &mut PgConnection, image: &DecodedImage) -> QueryResult<String> {
    let name = image.generate_file_name();

    diesel::insert_into(media_files::table)
        .values(&NewMediaFile {
            name: &name,
            content_type: &image.content_type,
            data: &image.data,
        })
        .execute(conn)?;

    Ok(name)
}

pub fn delete(conn: &mut PgConnection, name: &str) -> QueryResult<()> {
    diesel::delete(media_files::table.find(name)).execute(conn)?;
    Ok(())
}

pub fn find(conn: &mut PgConnection, name: &str) -> QueryResult<Option<MediaFile>> {
    media_files::table
        .find(name)
        .select(MediaFile::as_select())
        .first(conn)
        .optional()
}

/// Absolute URL for a stored media name.
pub fn url(public_url: &str, name: &str) -> String {
    format!("{}{}/{}", public_url, MEDIA_PATH, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        assert_eq!(
            url("http://localhost:3000", "abc.png"),
            "http://localhost:3000/media/abc.png"
        );
    }
}
