use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::stage::Stage;

/// Language of user-facing text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

impl FromStr for Locale {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" | "vn" | "vi-vn" => Ok(Self::Vi),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            _ => Err(SearchError::UnknownLocale(s.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vi => "vi",
            Self::En => "en",
        })
    }
}

/// Every sentence the lookup shows to a user, per locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    locale: Locale,
}

impl MessageCatalog {
    #[must_use]
    pub const fn new(locale: Locale) -> Self {
        Self { locale }
    }

    #[must_use]
    pub fn empty_query(&self) -> String {
        match self.locale {
            Locale::Vi => "Bạn chưa nhập từ khóa. Hãy nhập Serial, tên hàng hóa hoặc tên nhân viên.",
            Locale::En => "No query given. Enter a serial, a product name or a holder's name.",
        }
        .to_string()
    }

    #[must_use]
    pub fn empty_table(&self) -> String {
        match self.locale {
            Locale::Vi => "Chưa có dữ liệu tìm kiếm.",
            Locale::En => "No inventory data is loaded yet.",
        }
        .to_string()
    }

    /// Headline for a stage that produced `count` rows. `places` lists up to
    /// three region names and is only used by the region stage.
    #[must_use]
    pub fn found(&self, stage: Stage, query: &str, count: usize, places: &[String]) -> String {
        let places = places.join(", ");
        match (self.locale, stage) {
            (Locale::Vi, Stage::ExactSerial) => format!("Tìm thấy theo Serial: {query}"),
            (Locale::Vi, Stage::AllTokens) => {
                format!("Tìm thấy {count} kết quả tổng hợp cho: '{query}'")
            }
            (Locale::Vi, Stage::ProductName) => {
                format!("Tìm thấy {count} sản phẩm có tên chứa: '{query}'")
            }
            (Locale::Vi, Stage::ProductCode) => {
                format!("Tìm thấy {count} sản phẩm có mã chứa: '{query}'")
            }
            (Locale::Vi, Stage::Holder) => {
                format!("Tìm thấy {count} tài sản của nhân viên: '{query}'")
            }
            (Locale::Vi, Stage::Region) => {
                format!("Tìm thấy {count} kết quả tại kho/đơn vị: {places}...")
            }
            (Locale::Vi, Stage::PartialSerial) => format!("Tìm thấy Serial chứa: '{query}'"),
            (Locale::En, Stage::ExactSerial) => format!("Found by serial: {query}"),
            (Locale::En, Stage::AllTokens) => {
                format!("Found {count} combined results for: '{query}'")
            }
            (Locale::En, Stage::ProductName) => {
                format!("Found {count} products whose name contains: '{query}'")
            }
            (Locale::En, Stage::ProductCode) => {
                format!("Found {count} products whose code contains: '{query}'")
            }
            (Locale::En, Stage::Holder) => format!("Found {count} items held by: '{query}'"),
            (Locale::En, Stage::Region) => {
                format!("Found {count} results at warehouse/unit: {places}...")
            }
            (Locale::En, Stage::PartialSerial) => {
                format!("Found serials containing: '{query}'")
            }
        }
    }

    #[must_use]
    pub fn no_match(&self) -> String {
        match self.locale {
            Locale::Vi => "\
Không tìm thấy thông tin nào cho từ khóa này.

Gợi ý:
1. Kiểm tra Serial: đảm bảo nhập đúng chính xác (vd: 21200...).
2. Tên sản phẩm: thử nhập tên ngắn gọn (vd: Switch thay vì Switch 8 cổng...).
3. Tên nhân viên: nhập tên không dấu nếu có dấu không ra kết quả.",
            Locale::En => "\
Nothing matched this query.

Suggestions:
1. Serial: make sure it is typed exactly (e.g. 21200...).
2. Product name: try a shorter name (e.g. Switch instead of Switch 8 ports...).
3. Holder name: try the name without accents.",
        }
        .to_string()
    }

    #[must_use]
    pub fn greeting(&self) -> String {
        match self.locale {
            Locale::Vi => "Chào bạn! Tôi là Trợ lý Kho. Hãy nhập Serial, tên hàng hóa hoặc tên nhân viên để tôi tìm kiếm giúp bạn.",
            Locale::En => "Hello! I am the inventory assistant. Enter a serial, a product name or a holder's name and I will look it up.",
        }
        .to_string()
    }

    #[must_use]
    pub fn help(&self) -> String {
        match self.locale {
            Locale::Vi => "\
Hướng dẫn sử dụng:
1. Tìm theo Serial: nhập chính xác số Serial (ví dụ: CN12345).
2. Tìm theo tên hàng: nhập tên sản phẩm (ví dụ: Camera, Switch).
3. Tìm theo nhân viên: nhập tên nhân viên để xem tài sản họ đang giữ.
4. Kết hợp: nhập mã và tên cùng lúc (ví dụ: 42x Võ Minh).",
            Locale::En => "\
How to search:
1. By serial: type the exact serial (e.g. CN12345).
2. By product: type a product name (e.g. Camera, Switch).
3. By holder: type a person's name to list what they hold.
4. Combined: mix a code and a name (e.g. 42x Vo Minh).",
        }
        .to_string()
    }

    #[must_use]
    pub fn result_count(&self, count: usize) -> String {
        match self.locale {
            Locale::Vi => format!("Tìm thấy {count} kết quả."),
            Locale::En => format!("{count} result(s) found."),
        }
    }

    /// Shown when the loaded export has no serial column.
    #[must_use]
    pub fn missing_serial(&self) -> String {
        match self.locale {
            Locale::Vi => "Dữ liệu không có cột Serial; chỉ tìm được theo tên, mã, nhân viên và khu vực.",
            Locale::En => "The data has no serial column; only name, code, holder and region lookups work.",
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_parses_common_spellings() {
        assert_eq!("VI".parse::<Locale>().unwrap(), Locale::Vi);
        assert_eq!("en-US".parse::<Locale>().unwrap(), Locale::En);
        assert!(matches!(
            "fr".parse::<Locale>(),
            Err(SearchError::UnknownLocale(_))
        ));
    }

    #[test]
    fn every_message_is_non_empty() {
        for locale in [Locale::Vi, Locale::En] {
            let catalog = MessageCatalog::new(locale);
            for stage in Stage::CASCADE {
                assert!(!catalog.found(stage, "q", 1, &[]).is_empty());
            }
            assert!(!catalog.empty_query().is_empty());
            assert!(!catalog.empty_table().is_empty());
            assert!(!catalog.no_match().is_empty());
            assert!(!catalog.greeting().is_empty());
            assert!(!catalog.help().is_empty());
        }
    }

    #[test]
    fn region_headline_lists_places() {
        let catalog = MessageCatalog::new(Locale::En);
        let msg = catalog.found(
            Stage::Region,
            "q1",
            4,
            &["Quận 1".to_string(), "Quận 3".to_string()],
        );
        assert_eq!(msg, "Found 4 results at warehouse/unit: Quận 1, Quận 3...");
    }
}
