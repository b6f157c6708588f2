use std::fmt;
use std::path::Path;

/// An image format recognised purely from the entry's file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// `.jpg` / `.jpeg`
    Jpeg,
    /// `.png`
    Png,
    /// `.gif`
    Gif,
    /// `.webp`
    Webp,
}

impl ImageFormat {
    /// Detect the format from a name inside an archive, case-insensitively.
    ///
    /// Names ending in `/` are directory markers and never match.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with('/') {
            return None;
        }
        let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("IMG_0001.jpg", Some(ImageFormat::Jpeg))]
    #[case("IMG_0001.JPG", Some(ImageFormat::Jpeg))]
    #[case("portraits/bride.jpeg", Some(ImageFormat::Jpeg))]
    #[case("first-dance.PNG", Some(ImageFormat::Png))]
    #[case("confetti.gif", Some(ImageFormat::Gif))]
    #[case("rings.WebP", Some(ImageFormat::Webp))]
    #[case("raw/IMG_0001.CR2", None)]
    #[case("notes.txt", None)]
    #[case("jpg", None)]
    #[case(".jpg", None)]
    #[case("folder.jpg/", None)]
    #[case("__MACOSX/", None)]
    fn test_from_name(#[case] name: &str, #[case] expected: Option<ImageFormat>) {
        assert_eq!(ImageFormat::from_name(name), expected);
    }
}
