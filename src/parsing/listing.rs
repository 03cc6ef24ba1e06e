//! Field extraction from one parsed listing page.
//!
//! Every attribute lives behind the same markup shape: a container with an
//! `aria-label` naming the attribute, holding one child cell whose `title`
//! attribute differs from the label. The extractor set is an ordered registry
//! of independent functions over that shape; the dispatcher runs all of them
//! and isolates per-extractor failures so that dirty markup degrades a record
//! to partial instead of discarding it.

use std::collections::BTreeSet;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{error, warn};

use crate::dataset::{ListingRecord, Value, URL_FIELD};
use crate::error::ExtractError;

/// Values produced by one extractor: one or more named fields.
pub type FieldValues = Vec<(&'static str, Value)>;

/// An independent field extractor. Recoverable anomalies come back as
/// `Value::Null`; an `Err` is the dispatcher's backstop for genuinely
/// malformed content (e.g. numeric text that survives cleanup but still does
/// not parse).
pub type Extractor = fn(&Html) -> Result<FieldValues, ExtractError>;

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-cy="adPageAdTitle"]"#).expect("static selector"));
static DESCRIPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-cy="adPageAdDescription"]"#).expect("static selector"));

/// Leading numeric run, permitting the Polish decimal comma.
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9][0-9,.]*").expect("static regex"));

/// The ordered extractor registry the dispatcher runs against every listing.
pub fn extractors() -> &'static [(&'static str, Extractor)] {
    &[
        ("price", price),
        ("price_per_m2", price_per_m2),
        ("floor_size", floor_size),
        ("floor", floor),
        ("rent", rent),
        ("building_type", building_type),
        ("windows_type", windows_type),
        ("year_of_construction", year_of_construction),
        ("number_of_rooms", number_of_rooms),
        ("condition", condition),
        ("outdoor_space", outdoor_space),
        ("heating", heating),
        ("parking_space", parking_space),
        ("market", market),
        ("advertiser_type", advertiser_type),
        ("available_from", available_from),
        ("ownership_form", ownership_form),
        ("lift", lift),
        ("media", media),
        ("security", security),
        ("equipment", equipment),
        ("additional_info", additional_info),
        ("building_material", building_material),
        ("feature_flags", feature_flags),
        ("title", title),
        ("ad_description", ad_description),
        ("address", address),
    ]
}

/// Run the full extractor set against one listing document and assemble a
/// record. A single extractor's failure is logged with its identity and does
/// not abort the record. Returns `None` only when the listing URL itself is
/// unusable — dedup and future runs lose meaning without it.
pub fn extract_listing(document: &Html, listing_url: &str) -> Option<ListingRecord> {
    if listing_url.trim().is_empty() {
        error!("listing has no usable url; dropping the record entirely");
        return None;
    }

    let mut record = ListingRecord::new();
    record.insert(URL_FIELD.to_string(), Value::from(listing_url));
    record.insert(
        "unique_id".to_string(),
        Value::from(unique_id_from_url(listing_url)),
    );
    record.insert(
        "created_at".to_string(),
        Value::Text(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
    );

    for (name, extractor) in extractors() {
        match extractor(document) {
            Ok(fields) => {
                for (field, value) in fields {
                    record.insert(field.to_string(), value);
                }
            }
            Err(err) => {
                warn!(extractor = name, error = %err, "extractor failed; continuing without its fields");
            }
        }
    }

    Some(record)
}

/// Numeric ad id hidden in the URL slug: the trailing `ID<code>` token is a
/// base-62 rendering of the portal's internal id, digits first, then
/// lowercase, then uppercase (`ID4dG6i` is 62365446).
fn unique_id_from_url(url: &str) -> Option<i64> {
    let slug = url.trim_end_matches(".html").rsplit('-').next()?;
    let code = slug.strip_prefix("ID").filter(|c| !c.is_empty())?;

    let mut id: i64 = 0;
    for ch in code.chars() {
        let digit = match ch {
            '0'..='9' => ch as i64 - '0' as i64,
            'a'..='z' => ch as i64 - 'a' as i64 + 10,
            'A'..='Z' => ch as i64 - 'A' as i64 + 36,
            _ => return None,
        };
        id = id.checked_mul(62)?.checked_add(digit)?;
    }
    Some(id)
}

// ---------------------------------------------------------------------------
// Shared lookup helpers ("exactly-one" pattern)
// ---------------------------------------------------------------------------

/// Recoverable lookup anomalies surface as a logged diagnostic and a missing
/// field, never as a dispatcher-level error.
fn recover(err: ExtractError) {
    warn!("{err}. Treating the field as missing.");
}

/// Locate the single element labeled `aria-label="{label}"`. Zero or many
/// matches is a wrong-count anomaly.
fn exactly_one<'a>(
    document: &'a Html,
    label: &str,
    field: &'static str,
) -> Result<ElementRef<'a>, ExtractError> {
    let selector = Selector::parse(&format!(r#"[aria-label="{label}"]"#))
        .map_err(|_| ExtractError::wrong_count(field, 1, 0))?;
    let matches: Vec<ElementRef> = document.select(&selector).collect();
    match matches.as_slice() {
        [only] => Ok(*only),
        other => Err(ExtractError::wrong_count(field, 1, other.len())),
    }
}

/// Text of the value cell inside a labeled container: the direct child whose
/// `title` attribute is present and differs from the label itself. Exactly
/// one such cell is expected.
fn labeled_cell(document: &Html, label: &str, field: &'static str) -> Option<String> {
    let lookup = || -> Result<String, ExtractError> {
        let container = exactly_one(document, label, field)?;
        let mut cells = container
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().attr("title").is_some_and(|t| t != label))
            .map(|el| el.text().collect::<String>().trim().to_string());
        match (cells.next(), cells.next()) {
            (Some(cell), None) => Ok(cell),
            (None, _) => Err(ExtractError::wrong_count(field, 1, 0)),
            (Some(_), Some(_)) => Err(ExtractError::wrong_count(field, 1, 2 + cells.count())),
        }
    };
    lookup().map_err(recover).ok()
}

/// Whole-container text for the fields that live in a header strip rather
/// than a labeled table row.
fn container_text(document: &Html, label: &str, field: &'static str) -> Option<String> {
    exactly_one(document, label, field)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .map_err(recover)
        .ok()
}

/// One nullable text field behind the standard labeled-cell shape.
fn text_field(document: &Html, label: &str, field: &'static str) -> Result<FieldValues, ExtractError> {
    Ok(vec![(field, Value::from(labeled_cell(document, label, field)))])
}

/// One nullable integer field; cleanup keeps digits and separators, and text
/// that still fails to parse is the dispatcher's problem.
fn int_field(document: &Html, label: &str, field: &'static str) -> Result<FieldValues, ExtractError> {
    let value = match labeled_cell(document, label, field) {
        Some(text) => Value::Int(parse_int(field, &text)?),
        None => Value::Null,
    };
    Ok(vec![(field, value)])
}

/// Integer parse after separator cleanup: `"1 500 000 zł"` -> 1500000.
fn parse_int(field: &'static str, text: &str) -> Result<i64, ExtractError> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ExtractError::unparseable(field, text));
    }
    digits
        .parse()
        .map_err(|_| ExtractError::unparseable(field, text))
}

/// Float parse of the leading numeric run, with the decimal comma normalized
/// to a point: `"119,64 m2"` -> 119.64.
fn parse_leading_float(field: &'static str, text: &str) -> Result<f64, ExtractError> {
    let trimmed = text.trim();
    let run = LEADING_NUMBER
        .find(trimmed)
        .ok_or_else(|| ExtractError::unparseable(field, text))?;
    run.as_str()
        .replace(',', ".")
        .parse()
        .map_err(|_| ExtractError::unparseable(field, text))
}

/// Split floor text into (floor, floors in building). `parter` is the ground
/// floor; a `/` separates the floor from the building height when present.
fn resolve_floor(field: &'static str, text: &str) -> Result<(i64, Option<i64>), ExtractError> {
    let compact: String = text.split_whitespace().collect::<String>().to_lowercase();

    let parse_part = |part: &str| -> Result<i64, ExtractError> {
        if part == "parter" {
            Ok(0)
        } else {
            part.parse().map_err(|_| ExtractError::unparseable(field, text))
        }
    };

    if let Some((level, total)) = compact.split_once(['/', '\\']) {
        let floor = parse_part(level)?;
        let floors_in_building = if total.is_empty() {
            None
        } else {
            Some(parse_part(total)?)
        };
        Ok((floor, floors_in_building))
    } else {
        Ok((parse_part(&compact)?, None))
    }
}

// ---------------------------------------------------------------------------
// Extractor set
// ---------------------------------------------------------------------------

/// Price sits in its own header strip, not a labeled table row: the value is
/// the text of the `Cena` container itself.
fn price(document: &Html) -> Result<FieldValues, ExtractError> {
    let Some(text) = container_text(document, "Cena", "price") else {
        return Ok(vec![("price", Value::Null)]);
    };
    // Prices are whole złoty; a decimal separator means the markup changed
    // and a digits-only parse would produce the wrong amount.
    if text.contains('.') {
        warn!("Unexpected . encountered in price in the listing");
        return Err(ExtractError::unparseable("price", text));
    }
    if text.contains(',') {
        warn!("Unexpected , encountered in price in the listing");
        return Err(ExtractError::unparseable("price", text));
    }
    Ok(vec![("price", Value::Int(parse_int("price", &text)?))])
}

fn price_per_m2(document: &Html) -> Result<FieldValues, ExtractError> {
    let value = match container_text(document, "Cena za metr kwadratowy", "price_per_m2") {
        Some(text) => Value::Int(parse_int("price_per_m2", &text)?),
        None => Value::Null,
    };
    Ok(vec![("price_per_m2", value)])
}

fn floor_size(document: &Html) -> Result<FieldValues, ExtractError> {
    let value = match labeled_cell(document, "Powierzchnia", "floor_size") {
        Some(text) => Value::Float(parse_leading_float("floor_size", &text)?),
        None => Value::Null,
    };
    Ok(vec![("floor_size_in_m2", value)])
}

/// Composite field: `"Parter / 5"` embeds both numbers; a bare `"4"` falls
/// back to the independent `Liczba pięter` lookup for the building height.
fn floor(document: &Html) -> Result<FieldValues, ExtractError> {
    let Some(text) = labeled_cell(document, "Piętro", "floor") else {
        return Ok(vec![
            ("floor", Value::Null),
            ("floors_in_building", Value::Null),
        ]);
    };
    let (level, mut floors_in_building) = resolve_floor("floor", &text)?;
    if floors_in_building.is_none() {
        floors_in_building = labeled_cell(document, "Liczba pięter", "floors_in_building")
            .and_then(|t| t.trim().parse().ok());
    }
    Ok(vec![
        ("floor", Value::Int(level)),
        ("floors_in_building", Value::from(floors_in_building)),
    ])
}

fn rent(document: &Html) -> Result<FieldValues, ExtractError> {
    let value = match labeled_cell(document, "Czynsz", "rent") {
        Some(text) => Value::Int(parse_int("rent", &text)?),
        None => Value::Null,
    };
    Ok(vec![("rent", value)])
}

fn building_type(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Rodzaj zabudowy", "building_type")
}

fn windows_type(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Okna", "windows_type")
}

fn year_of_construction(document: &Html) -> Result<FieldValues, ExtractError> {
    int_field(document, "Rok budowy", "year_of_construction")
}

fn number_of_rooms(document: &Html) -> Result<FieldValues, ExtractError> {
    int_field(document, "Liczba pokoi", "number_of_rooms")
}

fn condition(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Stan wykończenia", "condition")
}

fn outdoor_space(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Balkon / ogród / taras", "outdoor_space")
}

fn heating(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Ogrzewanie", "heating")
}

fn parking_space(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Miejsce parkingowe", "parking_space")
}

fn market(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Rynek", "market")
}

fn advertiser_type(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Typ ogłoszeniodawcy", "advertiser_type")
}

fn available_from(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Dostępne od", "available_from")
}

fn ownership_form(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Forma własności", "ownership_form")
}

fn lift(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Winda", "lift")
}

fn media(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Media", "media")
}

fn security(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Zabezpieczenia", "security")
}

fn equipment(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Wyposażenie", "equipment")
}

fn additional_info(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Informacje dodatkowe", "additional_info")
}

fn building_material(document: &Html) -> Result<FieldValues, ExtractError> {
    text_field(document, "Materiał budynku", "building_material")
}

/// Union of the comma-separated entries of the four feature-list fields,
/// lowercased. A slash-joined entry like `garaż/miejsce parkingowe` also
/// contributes each of its parts.
fn additional_features(document: &Html) -> BTreeSet<String> {
    const SOURCES: [(&str, &str); 4] = [
        ("Media", "media"),
        ("Zabezpieczenia", "security"),
        ("Wyposażenie", "equipment"),
        ("Informacje dodatkowe", "additional_info"),
    ];

    let mut features = BTreeSet::new();
    for (label, field) in SOURCES {
        // Reuses the plain text-field labels; absence is already diagnosed
        // by the corresponding text extractor.
        let Ok(container) = exactly_one(document, label, field) else {
            continue;
        };
        let text = container
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().attr("title").is_some_and(|t| t != label))
            .map(|el| el.text().collect::<String>())
            .collect::<String>();
        for entry in text.split(',') {
            let entry = entry.trim().to_lowercase();
            if entry.is_empty() {
                continue;
            }
            if entry.contains('/') {
                for part in entry.split('/') {
                    features.insert(part.trim().to_string());
                }
            }
            features.insert(entry);
        }
    }
    features
}

/// Boolean presence flags resolved from the feature lists, 1/0 per the
/// dataset's integer convention.
fn feature_flags(document: &Html) -> Result<FieldValues, ExtractError> {
    let features = additional_features(document);
    let has = |names: &[&str]| Value::Int(names.iter().any(|n| features.contains(*n)) as i64);
    Ok(vec![
        ("air_conditioning", has(&["klimatyzacja"])),
        ("basement", has(&["piwnica"])),
        ("elevator", has(&["winda"])),
        ("balcony", has(&["balkon"])),
        ("garden", has(&["ogród", "ogródek"])),
        ("terrace", has(&["taras"])),
        ("parking", has(&["miejsce parkingowe"])),
        ("garage", has(&["garaż"])),
    ])
}

fn title(document: &Html) -> Result<FieldValues, ExtractError> {
    let value = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty());
    Ok(vec![("title", Value::from(value))])
}

fn ad_description(document: &Html) -> Result<FieldValues, ExtractError> {
    let value = document
        .select(&DESCRIPTION_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty());
    Ok(vec![("ad_description", Value::from(value))])
}

fn address(document: &Html) -> Result<FieldValues, ExtractError> {
    let value = container_text(document, "Adres", "address")
        .filter(|text| !text.is_empty())
        .map_or(Value::Null, Value::Text);
    Ok(vec![("address", value)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Listing fixture in the labeled-cell markup shape the extractors
    /// expect: a header strip for the price plus one table row per label.
    fn listing_fixture(rows: &[(&str, &str)]) -> Html {
        let table: String = rows
            .iter()
            .map(|(label, value)| {
                format!(
                    r#"<div aria-label="{label}">
                         <div title="{label}">{label}</div>
                         <div title="{value}">{value}</div>
                       </div>"#
                )
            })
            .collect();
        Html::parse_document(&format!(
            r#"<html><body>
                 <h1 data-cy="adPageAdTitle">Mieszkanie w kamienicy w Śródmieściu</h1>
                 <div aria-label="Cena">1 500 000 zł</div>
                 <div aria-label="Adres">Śródmieście, Warszawa</div>
                 {table}
               </body></html>"#
        ))
    }

    fn full_fixture() -> Html {
        listing_fixture(&[
            ("Powierzchnia", "119,64 m2"),
            ("Rodzaj zabudowy", "kamienica"),
            ("Okna", "plastikowe"),
            ("Rok budowy", "1939"),
            ("Liczba pokoi", "3"),
            ("Stan wykończenia", "do zamieszkania"),
            ("Piętro", "4/5"),
            ("Czynsz", "850 zł"),
            ("Ogrzewanie", "miejskie"),
            ("Rynek", "wtórny"),
        ])
    }

    #[test]
    fn price_parses_monetary_text_with_thousands_separators() {
        let doc = full_fixture();
        assert_eq!(price(&doc).unwrap(), vec![("price", Value::Int(1_500_000))]);
    }

    #[test]
    fn floor_size_parses_decimal_comma() {
        let doc = full_fixture();
        assert_eq!(
            floor_size(&doc).unwrap(),
            vec![("floor_size_in_m2", Value::Float(119.64))]
        );
    }

    #[test]
    fn text_fields_read_the_titled_cell() {
        let doc = full_fixture();
        assert_eq!(
            building_type(&doc).unwrap(),
            vec![("building_type", Value::from("kamienica"))]
        );
        assert_eq!(
            windows_type(&doc).unwrap(),
            vec![("windows_type", Value::from("plastikowe"))]
        );
        assert_eq!(
            year_of_construction(&doc).unwrap(),
            vec![("year_of_construction", Value::Int(1939))]
        );
        assert_eq!(
            number_of_rooms(&doc).unwrap(),
            vec![("number_of_rooms", Value::Int(3))]
        );
    }

    #[test]
    fn missing_container_yields_null_not_error() {
        let doc = full_fixture();
        assert_eq!(heating(&doc).unwrap(), vec![("heating", Value::from("miejskie"))]);
        assert_eq!(lift(&doc).unwrap(), vec![("lift", Value::Null)]);
        assert_eq!(media(&doc).unwrap(), vec![("media", Value::Null)]);
    }

    #[rstest]
    #[case("72", 72.0)]
    #[case("119,64", 119.64)]
    #[case("119.64", 119.64)]
    #[case("119", 119.0)]
    #[case("119.64m2", 119.64)]
    #[case("119.64 m2", 119.64)]
    #[case("119,64 m2", 119.64)]
    #[case("119,64 m", 119.64)]
    fn leading_float_parsing(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(parse_leading_float("floor_size", text).unwrap(), expected);
    }

    #[rstest]
    #[case("Parter / 5", 0, Some(5))]
    #[case("parter/5", 0, Some(5))]
    #[case("4/5", 4, Some(5))]
    #[case("4", 4, None)]
    #[case("parter", 0, None)]
    #[case("10 / 12", 10, Some(12))]
    fn floor_text_resolution(
        #[case] text: &str,
        #[case] floor: i64,
        #[case] floors_in_building: Option<i64>,
    ) {
        assert_eq!(
            resolve_floor("floor", text).unwrap(),
            (floor, floors_in_building)
        );
    }

    #[test]
    fn floor_falls_back_to_building_height_lookup() {
        let doc = listing_fixture(&[("Piętro", "4"), ("Liczba pięter", "5")]);
        assert_eq!(
            floor(&doc).unwrap(),
            vec![("floor", Value::Int(4)), ("floors_in_building", Value::Int(5))]
        );
    }

    #[test]
    fn floor_without_building_height_stays_null() {
        let doc = listing_fixture(&[("Piętro", "4")]);
        assert_eq!(
            floor(&doc).unwrap(),
            vec![("floor", Value::Int(4)), ("floors_in_building", Value::Null)]
        );
    }

    #[test]
    fn unparseable_floor_text_is_an_error_for_the_dispatcher() {
        let doc = listing_fixture(&[("Piętro", "poddasze")]);
        assert!(floor(&doc).is_err());
    }

    #[test]
    fn duplicated_container_is_a_wrong_count_and_yields_null() {
        let html = r#"<html><body>
          <div aria-label="Okna"><div title="x">plastikowe</div></div>
          <div aria-label="Okna"><div title="x">drewniane</div></div>
        </body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(
            windows_type(&doc).unwrap(),
            vec![("windows_type", Value::Null)]
        );
    }

    #[test]
    fn dispatch_isolates_a_single_failing_field() {
        // Malformed year forces an extractor error; every other field must
        // still come through.
        let doc = listing_fixture(&[("Rok budowy", "nieznany"), ("Liczba pokoi", "3")]);
        let record = extract_listing(&doc, "https://www.otodom.pl/pl/oferta/x").unwrap();

        assert_eq!(record.get("year_of_construction"), None);
        assert_eq!(record.get("number_of_rooms"), Some(&Value::Int(3)));
        assert_eq!(record.get("price"), Some(&Value::Int(1_500_000)));
        assert_eq!(
            record.get("url"),
            Some(&Value::from("https://www.otodom.pl/pl/oferta/x"))
        );
    }

    #[test]
    fn dispatch_drops_record_without_url() {
        let doc = full_fixture();
        assert!(extract_listing(&doc, "  ").is_none());
    }

    #[test]
    fn price_with_decimal_separator_is_rejected() {
        // "1 500,50 zł" must not come out as 150050.
        let doc = Html::parse_document(
            r#"<html><body><div aria-label="Cena">1 500,50 zł</div></body></html>"#,
        );
        assert!(price(&doc).is_err());

        let doc = Html::parse_document(
            r#"<html><body><div aria-label="Cena">1 500.50 zł</div></body></html>"#,
        );
        assert!(price(&doc).is_err());
    }

    #[rstest]
    #[case(
        "https://www.otodom.pl/pl/oferta/mieszkanie-w-kamienicy-w-srodmiesciu-ID4dG6i.html",
        Some(62_365_446)
    )]
    #[case(
        "https://www.otodom.pl/pl/oferta/penthouse-na-marymonckiej-ID4ehkP",
        Some(62_508_575)
    )]
    #[case("https://www.otodom.pl/pl/oferta/promo-0", None)]
    #[case("https://www.otodom.pl/pl/oferta/bez-identyfikatora", None)]
    fn unique_id_decodes_from_the_url_slug(#[case] url: &str, #[case] expected: Option<i64>) {
        assert_eq!(unique_id_from_url(url), expected);
    }

    #[test]
    fn feature_flags_resolve_from_the_feature_lists() {
        let doc = listing_fixture(&[
            ("Media", "internet"),
            ("Zabezpieczenia", "system alarmowy, teren zamknięty, domofon / wideofon"),
            (
                "Informacje dodatkowe",
                "klimatyzacja, balkon, piwnica, garaż/miejsce parkingowe",
            ),
        ]);
        let flags = feature_flags(&doc).unwrap();
        let flag = |name: &str| {
            flags
                .iter()
                .find(|(field, _)| *field == name)
                .map(|(_, value)| value.clone())
                .unwrap()
        };

        assert_eq!(flag("air_conditioning"), Value::Int(1));
        assert_eq!(flag("basement"), Value::Int(1));
        assert_eq!(flag("balcony"), Value::Int(1));
        // The slash-joined entry contributes both of its parts.
        assert_eq!(flag("garage"), Value::Int(1));
        assert_eq!(flag("parking"), Value::Int(1));
        assert_eq!(flag("elevator"), Value::Int(0));
        assert_eq!(flag("garden"), Value::Int(0));
        assert_eq!(flag("terrace"), Value::Int(0));
    }

    #[test]
    fn feature_flags_default_to_zero_without_feature_lists() {
        let doc = listing_fixture(&[]);
        let flags = feature_flags(&doc).unwrap();
        assert!(flags.iter().all(|(_, value)| *value == Value::Int(0)));
    }

    #[test]
    fn ad_description_reads_the_description_block() {
        let doc = Html::parse_document(
            r#"<html><body>
              <div data-cy="adPageAdDescription"><p>Gratka dla fanów przedwojennych kamienic!</p></div>
            </body></html>"#,
        );
        assert_eq!(
            ad_description(&doc).unwrap(),
            vec![(
                "ad_description",
                Value::from("Gratka dla fanów przedwojennych kamienic!")
            )]
        );

        let empty = Html::parse_document("<html><body></body></html>");
        assert_eq!(
            ad_description(&empty).unwrap(),
            vec![("ad_description", Value::Null)]
        );
    }

    #[test]
    fn dispatch_stamps_id_and_creation_time() {
        let doc = full_fixture();
        let record = extract_listing(
            &doc,
            "https://www.otodom.pl/pl/oferta/mieszkanie-w-kamienicy-w-srodmiesciu-ID4dG6i.html",
        )
        .unwrap();

        assert_eq!(record.get("unique_id"), Some(&Value::Int(62_365_446)));
        let created = record.get("created_at").and_then(Value::as_str).unwrap();
        let stamp = Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap();
        assert!(stamp.is_match(created));
    }

    #[test]
    fn dispatch_assembles_full_record() {
        let doc = full_fixture();
        let record = extract_listing(&doc, "https://www.otodom.pl/pl/oferta/x").unwrap();

        assert_eq!(record.get("floor"), Some(&Value::Int(4)));
        assert_eq!(record.get("floors_in_building"), Some(&Value::Int(5)));
        assert_eq!(record.get("rent"), Some(&Value::Int(850)));
        assert_eq!(record.get("market"), Some(&Value::from("wtórny")));
        assert_eq!(
            record.get("title"),
            Some(&Value::from("Mieszkanie w kamienicy w Śródmieściu"))
        );
        assert_eq!(
            record.get("address"),
            Some(&Value::from("Śródmieście, Warszawa"))
        );
        // Fields without a container in the fixture are null, not absent.
        assert_eq!(record.get("equipment"), Some(&Value::Null));
    }
}
