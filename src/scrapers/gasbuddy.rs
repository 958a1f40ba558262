//! GasBuddy zip code search scraper.
//!
//! Search results are rendered as a list of station cards. Each card holds a
//! name header linking to the station page, an address block split by a
//! `<br>`, and (when someone reported one recently) a price with the time and
//! the user behind the report.
//!
//! # URL Pattern
//!
//! `https://www.gasbuddy.com/home?search=19901&fuel=1`, where `fuel=1` selects
//! regular gasoline.

use crate::errors::ExtractError;
use crate::models::{PriceReport, Region, StationRecord, ZipCode};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Fuel type filter sent with every search (regular).
pub const FUEL_FILTER: &str = "1";

const STATION_CLASSES: &str = "panel__panel___3Q2zW panel__white___19KTz colors__bgWhite___1stjL panel__bordered___1Xe-S panel__rounded___2etNE GenericStationListItem__station___1O4vF GenericStationListItem__clickable___30MZX";
const ADDRESS_CLASSES: &str = "GenericStationListItem__address___1VFQ3";
const NAME_CLASSES: &str = "header__header3___1b1oq header__header___1zII0 header__evergreen___2DD39 header__snug___lRSNK GenericStationListItem__stationNameHeader___3qxdy";
const PRICE_CLASSES: &str = "text__left___1iOw3 GenericStationListItem__price___3GpKP";
const POSTED_TIME_CLASSES: &str = "ReportedBy__postedTime___J5H9Z";
const REPORTER_CLASSES: &str = "ReportedBy__user___gVNBF";

static STATION: Lazy<Selector> = Lazy::new(|| class_selector("div", STATION_CLASSES));
static ADDRESS: Lazy<Selector> = Lazy::new(|| class_selector("div", ADDRESS_CLASSES));
static NAME_HEADER: Lazy<Selector> = Lazy::new(|| class_selector("h3", NAME_CLASSES));
static PRICE: Lazy<Selector> = Lazy::new(|| class_selector("span", PRICE_CLASSES));
static POSTED_TIME: Lazy<Selector> = Lazy::new(|| class_selector("span", POSTED_TIME_CLASSES));
static REPORTER: Lazy<Selector> = Lazy::new(|| class_selector("span", REPORTER_CLASSES));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Number of child nodes in a well-formed address block: street, `<br>`, city/state.
const ADDRESS_PARTS: usize = 3;

/// Build a selector matching `tag` elements that carry every class in `classes`.
///
/// Only called with the constant class lists above.
fn class_selector(tag: &str, classes: &str) -> Selector {
    let css = format!("{tag}.{}", classes.split_whitespace().join("."));
    Selector::parse(&css).unwrap()
}

/// Build the search page URL for a zip code.
///
/// `home` is appended to the base path, so a base such as
/// `https://mirror.example.com/gasbuddy` keeps its prefix.
///
/// ```ignore
/// let base = Url::parse("https://www.gasbuddy.com")?;
/// assert_eq!(
///     search_url(&base, &ZipCode::new("19901"))?.as_str(),
///     "https://www.gasbuddy.com/home?search=19901&fuel=1"
/// );
/// ```
pub fn search_url(base: &Url, zip: &ZipCode) -> Result<Url, url::ParseError> {
    let mut url = base.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push("home");
    url.query_pairs_mut()
        .append_pair("search", zip.as_str())
        .append_pair("fuel", FUEL_FILTER);
    Ok(url)
}

/// A station listing that could not be turned into a row.
#[derive(Debug)]
pub struct SkippedFragment {
    /// Outer HTML of the listing, kept for the warning log.
    pub html: String,
    pub error: ExtractError,
}

/// Everything extracted from one search results page.
#[derive(Debug, Default)]
pub struct PageExtraction {
    /// Rows in document order.
    pub records: Vec<StationRecord>,
    pub skipped: Vec<SkippedFragment>,
}

/// Return every element of `document` matching `selector`, in document order.
///
/// Markup is parsed leniently upstream, so an error page or an empty body
/// simply yields no fragments.
pub fn select_fragments<'a>(document: &'a Html, selector: &Selector) -> Vec<ElementRef<'a>> {
    document.select(selector).collect()
}

/// Parse a results page and extract a row from every station listing on it.
///
/// Listings with broken structure are collected in
/// [`PageExtraction::skipped`] instead of failing the page.
#[instrument(level = "debug", skip(html), fields(bytes = html.len()))]
pub fn extract_page(html: &str, region: Region, zip: &ZipCode) -> PageExtraction {
    let document = Html::parse_document(html);
    let fragments = select_fragments(&document, &STATION);
    debug!(count = fragments.len(), "Found station listings");

    let mut page = PageExtraction::default();
    for fragment in fragments {
        match extract_station(fragment, region, zip) {
            Ok(record) => {
                debug!(
                    id = %record.identifier,
                    name = %record.name,
                    price = ?record.price(),
                    updated_by = ?record.updated_by(),
                    "Extracted station"
                );
                page.records.push(record);
            }
            Err(error) => page.skipped.push(SkippedFragment {
                html: fragment.html(),
                error,
            }),
        }
    }
    page
}

/// Extract one station row from a listing fragment.
///
/// The address block, name and link are required; any of them missing is an
/// [`ExtractError`]. Price data is optional and all-or-nothing: see
/// [`extract_report`].
pub fn extract_station(
    fragment: ElementRef<'_>,
    region: Region,
    zip: &ZipCode,
) -> Result<StationRecord, ExtractError> {
    let address = fragment
        .select(&ADDRESS)
        .next()
        .ok_or(ExtractError::AddressMissing)?;
    // Text nodes as-is, elements by their contents.
    let parts: Vec<String> = address
        .children()
        .map(|node| match ElementRef::wrap(node) {
            Some(element) => element_text(element),
            None => node.value().as_text().map(|t| normalize(t)).unwrap_or_default(),
        })
        .collect();
    if parts.len() != ADDRESS_PARTS {
        return Err(ExtractError::AddressShape(parts.len()));
    }

    let header = fragment
        .select(&NAME_HEADER)
        .next()
        .ok_or(ExtractError::NameHeaderMissing)?;
    let link = header
        .select(&LINK)
        .next()
        .ok_or(ExtractError::NameLinkMissing)?;
    let identifier = link
        .value()
        .attr("href")
        .ok_or(ExtractError::IdentifierMissing)?
        .to_string();

    Ok(StationRecord {
        identifier,
        name: element_text(link),
        street_address: parts[0].clone(),
        city_state: parts[ADDRESS_PARTS - 1].clone(),
        region,
        zip_code: zip.clone(),
        report: extract_report(fragment),
    })
}

/// Look up price, report time and reporter. Returns `None` unless all three exist.
pub fn extract_report(fragment: ElementRef<'_>) -> Option<PriceReport> {
    let price = first_text(fragment, &PRICE);
    let last_update_time = first_text(fragment, &POSTED_TIME);
    let updated_by = first_text(fragment, &REPORTER);

    match (price, last_update_time, updated_by) {
        (Some(price), Some(last_update_time), Some(updated_by)) => Some(PriceReport {
            price,
            last_update_time,
            updated_by,
        }),
        _ => None,
    }
}

fn first_text(fragment: ElementRef<'_>, selector: &Selector) -> Option<String> {
    fragment.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize(&element.text().collect::<String>())
}

/// Collapse whitespace runs to single spaces and trim the ends.
fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! HTML builders shaped like the live search results markup.

    use super::*;

    pub fn station_card(inner: &str) -> String {
        format!(r#"<div class="{STATION_CLASSES}">{inner}</div>"#)
    }

    pub fn name_header(href: &str, name: &str) -> String {
        format!(r#"<h3 class="{NAME_CLASSES}"><a href="{href}">{name}</a></h3>"#)
    }

    pub fn address(street: &str, city_state: &str) -> String {
        format!(r#"<div class="{ADDRESS_CLASSES}">{street}<br/>{city_state}</div>"#)
    }

    pub fn price(value: &str) -> String {
        format!(r#"<span class="{PRICE_CLASSES}">{value}</span>"#)
    }

    pub fn posted_time(value: &str) -> String {
        format!(r#"<span class="{POSTED_TIME_CLASSES}">{value}</span>"#)
    }

    pub fn reporter(value: &str) -> String {
        format!(r#"<span class="{REPORTER_CLASSES}">{value}</span>"#)
    }

    pub fn page(cards: &[String]) -> String {
        format!(
            "<html><head><title>Gas Prices</title></head><body><div id=\"results\">{}</div></body></html>",
            cards.concat()
        )
    }

    /// A listing with name, address and a complete price report.
    pub fn priced_station(id: &str, name: &str) -> String {
        station_card(&format!(
            "{}{}{}<div>{}{}</div>",
            name_header(&format!("/station/{id}"), name),
            address("100 Main St", "Dover, DE"),
            price("$3.19"),
            posted_time("2 Hours Ago"),
            reporter("roadrunner"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn de() -> Region {
        Region::from_code("DE").unwrap()
    }

    fn zip() -> ZipCode {
        ZipCode::new("19901")
    }

    #[test]
    fn test_search_url() {
        let base = Url::parse("https://www.gasbuddy.com").unwrap();
        let url = search_url(&base, &ZipCode::new("01001")).unwrap();
        assert_eq!(url.as_str(), "https://www.gasbuddy.com/home?search=01001&fuel=1");
    }

    #[test]
    fn test_search_url_keeps_base_path() {
        let zip = ZipCode::new("19901");
        for base in [
            "https://mirror.example.com/gasbuddy",
            "https://mirror.example.com/gasbuddy/",
        ] {
            let url = search_url(&Url::parse(base).unwrap(), &zip).unwrap();
            assert_eq!(
                url.as_str(),
                "https://mirror.example.com/gasbuddy/home?search=19901&fuel=1"
            );
        }
    }

    #[test]
    fn test_search_url_rejects_cannot_be_a_base() {
        let base = Url::parse("mailto:prices@example.com").unwrap();
        assert!(search_url(&base, &ZipCode::new("19901")).is_err());
    }

    #[test]
    fn test_fully_priced_station() {
        let html = page(&[priced_station("42", "Shell")]);
        let result = extract_page(&html, de(), &zip());

        assert!(result.skipped.is_empty());
        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.identifier, "/station/42");
        assert_eq!(record.name, "Shell");
        assert_eq!(record.street_address, "100 Main St");
        assert_eq!(record.city_state, "Dover, DE");
        assert_eq!(record.region, de());
        assert_eq!(record.zip_code, zip());
        assert_eq!(record.price(), Some("$3.19"));
        assert_eq!(record.last_update_time(), Some("2 Hours Ago"));
        assert_eq!(record.updated_by(), Some("roadrunner"));
    }

    #[test]
    fn test_any_missing_report_field_drops_all_three() {
        let variants = [
            format!("{}{}", posted_time("1 Hour Ago"), reporter("someone")),
            format!("{}{}", price("$3.05"), reporter("someone")),
            format!("{}{}", price("$3.05"), posted_time("1 Hour Ago")),
            String::new(),
        ];

        for report in variants {
            let card = station_card(&format!(
                "{}{}{}",
                name_header("/station/7", "Wawa"),
                address("7 Loockerman St", "Dover, DE"),
                report
            ));
            let result = extract_page(&page(&[card]), de(), &zip());
            assert_eq!(result.records.len(), 1);
            let record = &result.records[0];
            assert!(record.report.is_none());
            assert_eq!(record.price(), None);
            assert_eq!(record.last_update_time(), None);
            assert_eq!(record.updated_by(), None);
        }
    }

    #[test]
    fn test_address_with_wrong_child_count_is_skipped() {
        let two_children = format!(r#"<div class="{ADDRESS_CLASSES}">100 Main St<br/></div>"#);
        let four_children =
            format!(r#"<div class="{ADDRESS_CLASSES}">100 Main St<br/>Suite 2<br/></div>"#);

        for block in [two_children, four_children] {
            let card = station_card(&format!(
                "{}{}{}",
                name_header("/station/9", "Sunoco"),
                block,
                price("$3.00")
            ));
            let result = extract_page(&page(&[card]), de(), &zip());
            assert!(result.records.is_empty());
            assert_eq!(result.skipped.len(), 1);
            assert!(matches!(result.skipped[0].error, ExtractError::AddressShape(_)));
            assert!(result.skipped[0].html.contains("Sunoco"));
        }
    }

    #[test]
    fn test_missing_address_block_is_skipped() {
        let card = station_card(&name_header("/station/1", "Exxon"));
        let result = extract_page(&page(&[card]), de(), &zip());
        assert!(result.records.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].error, ExtractError::AddressMissing);
    }

    #[test]
    fn test_missing_name_or_identifier_is_skipped() {
        let addr = address("1 State St", "Dover, DE");
        let no_header = station_card(&addr);
        let no_link = station_card(&format!(
            r#"<h3 class="{NAME_CLASSES}">Plain Name</h3>{addr}"#
        ));
        let no_href = station_card(&format!(
            r#"<h3 class="{NAME_CLASSES}"><a>Citgo</a></h3>{addr}"#
        ));

        let result = extract_page(&page(&[no_header, no_link, no_href]), de(), &zip());
        assert!(result.records.is_empty());
        let errors: Vec<&ExtractError> = result.skipped.iter().map(|s| &s.error).collect();
        assert_eq!(
            errors,
            vec![
                &ExtractError::NameHeaderMissing,
                &ExtractError::NameLinkMissing,
                &ExtractError::IdentifierMissing,
            ]
        );
    }

    #[test]
    fn test_records_follow_document_order() {
        let html = page(&[
            priced_station("1", "First"),
            priced_station("2", "Second"),
            priced_station("3", "Third"),
        ]);
        let names: Vec<String> = extract_page(&html, de(), &zip())
            .records
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_unrelated_or_broken_markup_yields_nothing() {
        for html in ["", "<html><body><p>Access denied</p></body></html>", "<div class=\"x\"><span"] {
            let result = extract_page(html, de(), &zip());
            assert!(result.records.is_empty());
            assert!(result.skipped.is_empty());
        }
    }

    #[test]
    fn test_text_whitespace_is_normalized() {
        let card = station_card(&format!(
            "{}{}",
            name_header("/station/5", "\n   Speedway \n  Express "),
            address("  12   Bay Rd ", " Dover,\n DE ")
        ));
        let result = extract_page(&page(&[card]), de(), &zip());
        let record = &result.records[0];
        assert_eq!(record.name, "Speedway Express");
        assert_eq!(record.street_address, "12 Bay Rd");
        assert_eq!(record.city_state, "Dover, DE");
    }
}
