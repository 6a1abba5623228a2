//! Listing page extraction
//!
//! Turns a raw `/view/{id}` document into a [`PageRecord`]. Field locations
//! come from a [`SelectorTable`], so markup changes upstream are handled in
//! configuration rather than code. Extraction is pure: no I/O, no clock.

mod convert;

pub use convert::{
    normalize_category, parse_comment_id, parse_count, parse_edited_date, parse_file_size,
    parse_listing_date, CATEGORY_PREFIX, COMMENT_ID_PREFIX, EDITED_DATE_FORMAT,
    LISTING_DATE_FORMAT,
};

use crate::config::SelectorTable;
use crate::model::{CommentRecord, PageRecord};
use crate::{ConfigError, ConfigResult, ExtractResult};
use scraper::{ElementRef, Html, Selector};

/// One compiled entry of the selector table
///
/// Written as `css selector` to read the text of the first match, or
/// `css selector @attr` to read an attribute of it.
#[derive(Debug, Clone)]
pub struct FieldSelector {
    selector: Selector,
    attr: Option<String>,
}

impl FieldSelector {
    /// Compiles a selector table entry
    ///
    /// # Arguments
    ///
    /// * `field` - Field name, used in error messages
    /// * `entry` - The table entry
    pub fn parse(field: &str, entry: &str) -> ConfigResult<Self> {
        // Only a whitespace-separated `@` starts the attribute, so `@` inside
        // an attribute selector value stays part of the CSS
        let (css, attr) = match entry.trim().rsplit_once(" @") {
            Some((css, attr)) => (css.trim(), Some(attr.trim())),
            None => (entry.trim(), None),
        };

        if let Some(attr) = attr {
            if attr.is_empty() || attr.contains(char::is_whitespace) {
                return Err(ConfigError::InvalidSelector {
                    field: field.to_string(),
                    message: format!("invalid attribute name '{}'", attr),
                });
            }
        }

        let selector = Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
            field: field.to_string(),
            message: format!("{:?}", e),
        })?;

        Ok(Self {
            selector,
            attr: attr.map(str::to_string),
        })
    }

    /// Reads this field from the first matching descendant of `scope`
    ///
    /// A missing element or attribute reads as an empty string.
    pub fn read(&self, scope: ElementRef<'_>) -> String {
        let Some(element) = scope.select(&self.selector).next() else {
            return String::new();
        };

        match &self.attr {
            Some(attr) => element
                .value()
                .attr(attr)
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            None => element.text().collect::<String>().trim().to_string(),
        }
    }
}

/// Compiled extractor for listing pages
#[derive(Debug, Clone)]
pub struct PageExtractor {
    title: FieldSelector,
    category: FieldSelector,
    submitter: FieldSelector,
    information: FieldSelector,
    file_size: FieldSelector,
    date: FieldSelector,
    seeders: FieldSelector,
    leechers: FieldSelector,
    completed: FieldSelector,
    info_hash: FieldSelector,
    description: FieldSelector,
    torrent_url: FieldSelector,
    magnet_url: FieldSelector,
    comment: Selector,
    comment_id: FieldSelector,
    comment_submitter: FieldSelector,
    comment_content: FieldSelector,
    comment_date: FieldSelector,
    comment_edited_date: FieldSelector,
}

impl PageExtractor {
    /// Compiles every selector in the table
    ///
    /// # Returns
    ///
    /// * `Ok(PageExtractor)` - All selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - The first entry that failed
    pub fn new(table: &SelectorTable) -> ConfigResult<Self> {
        let comment = FieldSelector::parse("comment", &table.comment)?;
        if comment.attr.is_some() {
            return Err(ConfigError::InvalidSelector {
                field: "comment".to_string(),
                message: "the comment container cannot read an attribute".to_string(),
            });
        }

        Ok(Self {
            title: FieldSelector::parse("title", &table.title)?,
            category: FieldSelector::parse("category", &table.category)?,
            submitter: FieldSelector::parse("submitter", &table.submitter)?,
            information: FieldSelector::parse("information", &table.information)?,
            file_size: FieldSelector::parse("file-size", &table.file_size)?,
            date: FieldSelector::parse("date", &table.date)?,
            seeders: FieldSelector::parse("seeders", &table.seeders)?,
            leechers: FieldSelector::parse("leechers", &table.leechers)?,
            completed: FieldSelector::parse("completed", &table.completed)?,
            info_hash: FieldSelector::parse("info-hash", &table.info_hash)?,
            description: FieldSelector::parse("description", &table.description)?,
            torrent_url: FieldSelector::parse("torrent-url", &table.torrent_url)?,
            magnet_url: FieldSelector::parse("magnet-url", &table.magnet_url)?,
            comment: comment.selector,
            comment_id: FieldSelector::parse("comment-id", &table.comment_id)?,
            comment_submitter: FieldSelector::parse(
                "comment-submitter",
                &table.comment_submitter,
            )?,
            comment_content: FieldSelector::parse("comment-content", &table.comment_content)?,
            comment_date: FieldSelector::parse("comment-date", &table.comment_date)?,
            comment_edited_date: FieldSelector::parse(
                "comment-edited-date",
                &table.comment_edited_date,
            )?,
        })
    }

    /// Extracts a listing page
    ///
    /// Any date, size, counter or comment ID that fails to parse fails the
    /// whole extraction; there is no partial record.
    pub fn extract(&self, html: &str) -> ExtractResult<PageRecord> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let comments = root
            .select(&self.comment)
            .map(|element| self.extract_comment(element))
            .collect::<ExtractResult<Vec<_>>>()?;

        Ok(PageRecord {
            title: self.title.read(root),
            category: normalize_category(&self.category.read(root)),
            submitter: self.submitter.read(root),
            information: self.information.read(root),
            file_size: parse_file_size(&self.file_size.read(root))?,
            date: parse_listing_date("date", &self.date.read(root))?,
            seeders: parse_count("seeders", &self.seeders.read(root))?,
            leechers: parse_count("leechers", &self.leechers.read(root))?,
            completed: parse_count("completed", &self.completed.read(root))?,
            info_hash: self.info_hash.read(root),
            description: self.description.read(root),
            torrent_url: self.torrent_url.read(root),
            magnet_url: self.magnet_url.read(root),
            comments,
        })
    }

    fn extract_comment(&self, element: ElementRef<'_>) -> ExtractResult<CommentRecord> {
        Ok(CommentRecord {
            id: parse_comment_id(&self.comment_id.read(element))?,
            submitter: self.comment_submitter.read(element),
            content: self.comment_content.read(element),
            date: parse_listing_date("comment-date", &self.comment_date.read(element))?,
            edited_date: parse_edited_date(&self.comment_edited_date.read(element))?,
        })
    }
}
