mod category;
mod photo;

pub use self::category::Category;
pub(crate) use self::photo::PhotoRow;
pub use self::photo::PhotoRecord;
