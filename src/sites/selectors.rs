//! CSS selectors for the notice boards.
//!
//! Update this file when a board changes its markup; each site keeps its
//! selectors in its own submodule.

use scraper::Selector;
use std::sync::LazyLock;

/// Main university CMS (`www.kangwon.ac.kr`).
pub mod main_portal {
    use super::*;

    pub static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody tr").unwrap());

    /// Marker on pinned rows.
    pub static PINNED: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".notice").unwrap());

    pub static TITLE_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("td.subject a").unwrap());

    /// Body containers, in order of preference.
    pub static CONTENT: LazyLock<[Selector; 3]> = LazyLock::new(|| {
        [
            Selector::parse("div#bbs_ntt_cn_con").unwrap(),
            Selector::parse("td.bbs_content").unwrap(),
            Selector::parse("div.bbs_content").unwrap(),
        ]
    });

    pub static PHOTO_AREA: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.photo_area").unwrap());
}

/// Department of Public Administration CMS (`padm.kangwon.ac.kr`).
pub mod admin {
    use super::*;

    pub static TITLE_CELL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("td.b-td-left.b-td-title").unwrap());

    pub static CONTENT: LazyLock<[Selector; 2]> = LazyLock::new(|| {
        [
            Selector::parse("div.b-content-box div.fr-view").unwrap(),
            Selector::parse("div.b-content-box").unwrap(),
        ]
    });

    pub static DATE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("li.b-date-box span:nth-of-type(2)").unwrap());

    pub static ATTACHMENT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.b-file-box a.file-down-btn").unwrap());
}

/// Engineering Education Innovation Center bulletin (`icee.kangwon.ac.kr`).
pub mod engineering {
    use super::*;

    pub static ROW: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("table.bbs_list tbody tr").unwrap());

    pub static TITLE_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("td.tit a").unwrap());

    pub static DATE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.dt").unwrap());

    pub static CONTENT: LazyLock<[Selector; 2]> = LazyLock::new(|| {
        [Selector::parse("div.view_cont").unwrap(), Selector::parse("div.note").unwrap()]
    });
}

/// Shared across sites.
pub mod common {
    use super::*;

    pub static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

    pub static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
}
