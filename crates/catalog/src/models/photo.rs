use crate::error::{Error, ErrorKind};
use crate::models::Category;
use exn::ResultExt;
use time::OffsetDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct PhotoRow {
    id: i64,
    image_url: String,
    category: String,
    photographer_email: String,
    created_at: i64,
}

/// A catalog row for one ingested photo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoRecord {
    pub id: i64,
    /// Public reference, e.g. `/uploads/photos/photo-1730712000000-0-123456789.jpg`.
    pub image_url: String,
    pub category: Category,
    pub photographer_email: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<PhotoRow> for PhotoRecord {
    type Error = Error;
    fn try_from(row: PhotoRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            image_url: row.image_url,
            category: row.category.parse::<Category>().or_raise(|| ErrorKind::InvalidData("category"))?,
            photographer_email: row.photographer_email,
            created_at: OffsetDateTime::from_unix_timestamp(row.created_at)
                .or_raise(|| ErrorKind::InvalidData("creation date"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: &str, created_at: i64) -> PhotoRow {
        PhotoRow {
            id: 7,
            image_url: "/uploads/photos/photo-1-0-42.jpg".to_string(),
            category: category.to_string(),
            photographer_email: "photographer@example.com".to_string(),
            created_at,
        }
    }

    #[test]
    fn test_row_to_model() {
        let record = PhotoRecord::try_from(row("morning-wedding", 1_730_712_000)).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.category, Category::MorningWedding);
        assert_eq!(record.created_at.unix_timestamp(), 1_730_712_000);
    }

    #[test]
    fn test_row_with_unknown_category() {
        let err = PhotoRecord::try_from(row("honeymoon", 0)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("category")));
    }

    #[test]
    fn test_row_with_out_of_range_timestamp() {
        let err = PhotoRecord::try_from(row("pre-wedding", i64::MAX)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("creation date")));
    }
}
