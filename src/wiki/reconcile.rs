//! Two-way sync between the flat wiki table and the wiki document

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::wiki::escape::{escape_content, unescape_content};
use crate::wiki::flat::{join_list, split_list, FlatRow};
use crate::wiki::page::{ListField, PageType, Spoiler, WikiDocument, WikiPage};
use crate::wiki::WikiError;

/// Outcome of updating the document from the flat table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonSync {
    /// Pages whose JSON changed, sorted and unique
    pub updated: Vec<String>,
    /// Other pages created from CSV rows
    pub added: Vec<String>,
}

impl JsonSync {
    pub fn is_unchanged(&self) -> bool {
        self.updated.is_empty()
    }
}

/// Outcome of updating the flat table from the document
#[derive(Debug, Clone, Default)]
pub struct FlatSync {
    pub rows: Vec<FlatRow>,
    /// Rows created for pages the table did not have
    pub added: Vec<String>,
    /// Rows no page maps to, sorted
    pub orphans: Vec<String>,
}

impl FlatSync {
    /// Drop orphaned rows when forced, otherwise refuse to continue
    pub fn resolve_orphans(self, force: bool) -> Result<Vec<FlatRow>, WikiError> {
        if self.orphans.is_empty() {
            return Ok(self.rows);
        }
        if !force {
            return Err(WikiError::Orphans {
                names: self.orphans,
            });
        }

        let orphans: HashSet<&String> = self.orphans.iter().collect();
        Ok(self
            .rows
            .into_iter()
            .filter(|r| !orphans.contains(&r.name))
            .collect())
    }
}

/// Pages added by [`seed_pages`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub bots: Vec<String>,
    pub parts: Vec<String>,
}

fn parse_page_type(row: &FlatRow) -> Result<PageType, WikiError> {
    row.page_type
        .parse::<PageType>()
        .map_err(|_| WikiError::UnknownPageType {
            name: row.name.clone(),
            page_type: row.page_type.clone(),
        })
}

fn non_empty(cell: &str) -> Option<&str> {
    if cell.is_empty() {
        None
    } else {
        Some(cell)
    }
}

fn set_if_changed<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Copy a row's cells onto a page; returns whether anything changed
///
/// Empty cells remove the field. Only the relationship columns of the
/// page's own type are considered.
fn apply_row(page: &mut WikiPage, row: &FlatRow, page_type: PageType) -> Result<bool, WikiError> {
    let content = non_empty(&row.content).map(unescape_content);
    let spoiler = non_empty(&row.spoiler)
        .map(|s| Spoiler::parse_cell(&row.name, s))
        .transpose()?;

    let mut changed = set_if_changed(&mut page.content, content);
    changed |= set_if_changed(&mut page.spoiler, spoiler);

    for field in page_type.list_fields() {
        let list = split_list(row.list_cell(*field));
        changed |= set_if_changed(page.list_mut(*field), list);
    }

    if page_type.has_part_category() {
        let category = non_empty(&row.part_category).map(str::to_string);
        changed |= set_if_changed(&mut page.part_category, category);
    }

    Ok(changed)
}

fn require_collection<'a>(
    doc: &'a mut WikiDocument,
    page_type: PageType,
    name: &str,
) -> Result<&'a mut Vec<WikiPage>, WikiError> {
    doc.collection_mut(page_type)
        .ok_or_else(|| WikiError::MissingCollection {
            name: name.to_string(),
            collection: page_type.collection().to_string(),
        })
}

/// Update the document from the flat table (CSV authoritative for text)
///
/// Rows are applied in file order. A row without a matching page may only
/// create an Other page; any other type is an error since typed pages come
/// from the extracted game data. A row whose collection is absent from the
/// document, or whose name belongs to a page of another type, is an error.
pub fn csv_to_json(doc: &mut WikiDocument, rows: &[FlatRow]) -> Result<JsonSync, WikiError> {
    let mut sync = JsonSync::default();

    for row in rows {
        let page_type = parse_page_type(row)?;
        let owner = doc.owner_of(&row.name);
        let collection = require_collection(doc, page_type, &row.name)?;

        match collection.iter().position(|p| p.name == row.name) {
            Some(idx) => {
                if apply_row(&mut collection[idx], row, page_type)? {
                    sync.updated.push(row.name.clone());
                }
            }
            None => {
                if let Some(owner) = owner {
                    return Err(WikiError::DuplicatePage {
                        name: row.name.clone(),
                        first: owner.collection().to_string(),
                        second: page_type.collection().to_string(),
                    });
                }
                if page_type != PageType::Other {
                    return Err(WikiError::UnexpectedNewPage {
                        name: row.name.clone(),
                        page_type: page_type.to_string(),
                    });
                }
                let mut page = WikiPage::new(row.name.clone());
                apply_row(&mut page, row, page_type)?;
                collection.push(page);
                sync.updated.push(row.name.clone());
                sync.added.push(row.name.clone());
            }
        }
    }

    doc.sort();
    sync.updated.sort();
    sync.updated.dedup();
    Ok(sync)
}

fn fill_row(row: &mut FlatRow, page: &WikiPage, page_type: PageType) {
    row.page_type = page_type.as_str().to_string();
    row.content = page
        .content
        .as_deref()
        .map(escape_content)
        .unwrap_or_default();
    row.spoiler = page
        .spoiler
        .map(|s| s.as_str().to_string())
        .unwrap_or_default();

    let own_lists = page_type.list_fields();
    for field in [
        ListField::Bots,
        ListField::Parts,
        ListField::Groups,
        ListField::Supergroups,
        ListField::Subpages,
    ] {
        *row.list_cell_mut(field) = if own_lists.contains(&field) {
            join_list(page.list(field))
        } else {
            String::new()
        };
    }

    row.part_category = if page_type.has_part_category() {
        page.part_category.clone().unwrap_or_default()
    } else {
        String::new()
    };
}

/// Update the flat table from the document (JSON authoritative for structure)
///
/// Every page gets a row; rows that no page maps to are reported as
/// orphans and left in place until [`FlatSync::resolve_orphans`].
pub fn json_to_csv(doc: &WikiDocument, rows: Vec<FlatRow>) -> Result<FlatSync, WikiError> {
    let mut rows = rows;
    let mut positions: HashMap<String, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (r.name.clone(), i))
        .collect();
    let mut untouched: HashSet<String> = positions.keys().cloned().collect();
    let mut owners: HashMap<&str, PageType> = HashMap::new();
    let mut added = Vec::new();

    for page_type in PageType::all() {
        for page in doc.pages(*page_type) {
            if let Some(first) = owners.insert(&page.name, *page_type) {
                return Err(WikiError::DuplicatePage {
                    name: page.name.clone(),
                    first: first.collection().to_string(),
                    second: page_type.collection().to_string(),
                });
            }

            let idx = match positions.get(&page.name) {
                Some(&idx) => idx,
                None => {
                    rows.push(FlatRow::new(page.name.clone()));
                    positions.insert(page.name.clone(), rows.len() - 1);
                    added.push(page.name.clone());
                    rows.len() - 1
                }
            };
            fill_row(&mut rows[idx], page, *page_type);
            untouched.remove(&page.name);
        }
    }

    let mut orphans: Vec<String> = untouched.into_iter().collect();
    orphans.sort();

    Ok(FlatSync {
        rows,
        added,
        orphans,
    })
}

/// Page names from an extracted bots/parts document
///
/// Accepts a list of records or an object keyed by name.
fn extracted_names(source_name: &str, data: &Value) -> Result<Vec<String>, WikiError> {
    match data {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.get("Name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| WikiError::MissingName {
                        source_name: source_name.to_string(),
                        index,
                    })
            })
            .collect(),
        Value::Object(map) => Ok(map.keys().cloned().collect()),
        _ => Err(WikiError::Json(format!(
            "{} must be a JSON array or object",
            source_name
        ))),
    }
}

fn seed_collection(
    doc: &mut WikiDocument,
    page_type: PageType,
    names: Vec<String>,
) -> Result<Vec<String>, WikiError> {
    let mut existing: HashSet<String> = doc
        .pages(page_type)
        .iter()
        .map(|p| p.name.clone())
        .collect();
    let added: Vec<String> = names
        .into_iter()
        .filter(|name| existing.insert(name.clone()))
        .collect();

    if let Some(first) = added.first() {
        let pages = require_collection(doc, page_type, first)?;
        pages.extend(added.iter().cloned().map(WikiPage::new));
    }
    Ok(added)
}

/// Add a page for every extracted bot and part the wiki lacks
pub fn seed_pages(
    doc: &mut WikiDocument,
    bots: Option<&Value>,
    parts: Option<&Value>,
) -> Result<SeedReport, WikiError> {
    let mut report = SeedReport::default();

    if let Some(bots) = bots {
        let names = extracted_names("bots", bots)?;
        report.bots = seed_collection(doc, PageType::Bot, names)?;
    }
    if let Some(parts) = parts {
        let names = extracted_names("parts", parts)?;
        report.parts = seed_collection(doc, PageType::Part, names)?;
    }

    doc.sort();
    Ok(report)
}

/// Build a fresh document from the flat table alone
///
/// The result carries all eight collections, empty or not.
pub fn bootstrap(rows: &[FlatRow]) -> Result<WikiDocument, WikiError> {
    let mut doc = WikiDocument::with_all_collections();
    for row in rows {
        let page_type = parse_page_type(row)?;
        let mut page = WikiPage::new(row.name.clone());
        apply_row(&mut page, row, page_type)?;
        require_collection(&mut doc, page_type, &row.name)?.push(page);
    }
    doc.sort();
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::flat::{read_flat, write_flat};
    use serde_json::json;

    fn row(name: &str, page_type: &str, content: &str) -> FlatRow {
        FlatRow {
            name: name.to_string(),
            page_type: page_type.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    fn sample_doc() -> WikiDocument {
        WikiDocument::from_json(
            r#"{
                "Bots": [{"Name": "Grunt", "Content": "Basic combat bot"}],
                "Bot Groups": [{"Name": "Hunters", "Content": "Hunt things", "Spoiler": "Spoiler", "Bots": ["Hunter", "Tracker"]}],
                "Bot Supergroups": [],
                "Parts": [{"Name": "Ion Engine", "Content": "Power\nsource"}],
                "Part Groups": [{"Name": "Engines", "Content": "All engines", "Parts": ["Ion Engine"], "Part Category": "Power"}],
                "Part Supergroups": [],
                "Locations": [{"Name": "Factory", "Content": "Café level"}],
                "Other": [{"Name": "Intro", "Content": "Welcome", "Subpages": ["Bots", "Parts"]}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_content_update_and_spoiler_removal() {
        let mut doc = sample_doc();
        let mut hunters = row("Hunters", "Bot Group", "Updated\\ntext");
        hunters.bots = "Hunter,Tracker".to_string();

        let sync = csv_to_json(&mut doc, &[hunters]).unwrap();
        let page = &doc.pages(PageType::BotGroup)[0];
        assert_eq!(page.content.as_deref(), Some("Updated\ntext"));
        assert_eq!(page.spoiler, None);
        assert_eq!(sync.updated, vec!["Hunters".to_string()]);
    }

    #[test]
    fn test_spoiler_set_from_cell() {
        let mut doc = sample_doc();
        let mut grunt = row("Grunt", "Bot", "Basic combat bot");
        grunt.spoiler = "Redacted".to_string();

        csv_to_json(&mut doc, &[grunt]).unwrap();
        assert_eq!(doc.pages(PageType::Bot)[0].spoiler, Some(Spoiler::Redacted));
    }

    #[test]
    fn test_unchanged_row_is_not_reported() {
        let mut doc = sample_doc();
        let sync = csv_to_json(&mut doc, &[row("Grunt", "Bot", "Basic combat bot")]).unwrap();
        assert!(sync.is_unchanged());
    }

    #[test]
    fn test_group_lists_rederived() {
        let mut doc = sample_doc();
        let mut engines = row("Engines", "Part Group", "All engines");
        engines.parts = "Ion Engine,Nuclear Core".to_string();
        engines.part_category = "Power".to_string();

        let sync = csv_to_json(&mut doc, &[engines]).unwrap();
        assert_eq!(
            doc.pages(PageType::PartGroup)[0].parts,
            Some(vec!["Ion Engine".to_string(), "Nuclear Core".to_string()])
        );
        assert_eq!(sync.updated, vec!["Engines".to_string()]);
    }

    #[test]
    fn test_new_other_page_appended() {
        let mut doc = sample_doc();
        let mut faq = row("FAQ", "Other", "Questions");
        faq.subpages = "Intro".to_string();

        let sync = csv_to_json(&mut doc, &[faq]).unwrap();
        assert_eq!(sync.added, vec!["FAQ".to_string()]);
        assert_eq!(doc.pages(PageType::Other)[0].name, "FAQ");
        assert_eq!(doc.pages(PageType::Other)[0].subpages, Some(vec!["Intro".to_string()]));
        assert_eq!(doc.pages(PageType::Other)[1].name, "Intro");
    }

    #[test]
    fn test_row_for_absent_collection_is_fatal() {
        let mut doc = WikiDocument::from_json(r#"{"Bots": [{"Name": "Grunt", "Content": "x"}]}"#).unwrap();
        let err = csv_to_json(&mut doc, &[row("FAQ", "Other", "Questions")]).unwrap_err();
        match err {
            WikiError::MissingCollection { name, collection } => {
                assert_eq!(name, "FAQ");
                assert_eq!(collection, "Other");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(doc.collection(PageType::Other).is_none());
    }

    #[test]
    fn test_other_row_named_like_typed_page_is_fatal() {
        let mut doc = sample_doc();
        let err = csv_to_json(&mut doc, &[row("Grunt", "Other", "Not a bot")]).unwrap_err();
        match err {
            WikiError::DuplicatePage { name, first, second } => {
                assert_eq!(name, "Grunt");
                assert_eq!(first, "Bots");
                assert_eq!(second, "Other");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(doc.pages(PageType::Other).len(), 1);
    }

    #[test]
    fn test_new_typed_page_is_fatal() {
        let mut doc = sample_doc();
        let err = csv_to_json(&mut doc, &[row("Watcher", "Bot", "New")]).unwrap_err();
        match err {
            WikiError::UnexpectedNewPage { name, page_type } => {
                assert_eq!(name, "Watcher");
                assert_eq!(page_type, "Bot");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_page_type_is_fatal() {
        let mut doc = sample_doc();
        assert!(matches!(
            csv_to_json(&mut doc, &[row("Hack", "Hack", "")]),
            Err(WikiError::UnknownPageType { .. })
        ));
    }

    #[test]
    fn test_json_to_csv_fills_rows() {
        let doc = sample_doc();
        let sync = json_to_csv(&doc, Vec::new()).unwrap();
        assert_eq!(sync.rows.len(), 6);
        assert!(sync.orphans.is_empty());

        let hunters = sync.rows.iter().find(|r| r.name == "Hunters").unwrap();
        assert_eq!(hunters.page_type, "Bot Group");
        assert_eq!(hunters.bots, "Hunter,Tracker");
        assert_eq!(hunters.spoiler, "Spoiler");

        let ion = sync.rows.iter().find(|r| r.name == "Ion Engine").unwrap();
        assert_eq!(ion.content, "Power\\nsource");

        let factory = sync.rows.iter().find(|r| r.name == "Factory").unwrap();
        assert_eq!(factory.content, "Caf\\u00e9 level");
    }

    #[test]
    fn test_orphans_block_unless_forced() {
        let doc = sample_doc();
        let rows = vec![row("Grunt", "Bot", "Old"), row("Deleted Page", "Other", "Gone")];

        let sync = json_to_csv(&doc, rows.clone()).unwrap();
        assert_eq!(sync.orphans, vec!["Deleted Page".to_string()]);
        assert!(matches!(
            sync.resolve_orphans(false),
            Err(WikiError::Orphans { .. })
        ));

        let kept = json_to_csv(&doc, rows).unwrap().resolve_orphans(true).unwrap();
        assert!(kept.iter().all(|r| r.name != "Deleted Page"));
        assert_eq!(kept.len(), 6);
    }

    #[test]
    fn test_page_in_two_collections() {
        let mut doc = sample_doc();
        doc.collection_mut(PageType::Part).unwrap().push(WikiPage::new("Grunt"));
        assert!(matches!(
            json_to_csv(&doc, Vec::new()),
            Err(WikiError::DuplicatePage { .. })
        ));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let mut doc = sample_doc();
        doc.sort();
        let before = doc.to_json().unwrap();

        let rows = json_to_csv(&doc, Vec::new())
            .unwrap()
            .resolve_orphans(false)
            .unwrap();
        let csv_text = write_flat(&rows).unwrap();
        let reread = read_flat(&csv_text).unwrap();

        let sync = csv_to_json(&mut doc, &reread).unwrap();
        assert!(sync.is_unchanged(), "unexpected updates: {:?}", sync.updated);
        assert_eq!(doc.to_json().unwrap(), before);
    }

    #[test]
    fn test_partial_document_round_trip() {
        let text = concat!(
            "{\n",
            " \"Bots\": [\n",
            "  {\n   \"Name\": \"Grunt\",\n   \"Content\": \"Line one\\nLine two\"\n  },\n",
            "  {\n   \"Name\": \"Watcher\",\n   \"Spoiler\": \"Spoiler\"\n  }\n",
            " ],\n",
            " \"Other\": [\n",
            "  {\n   \"Name\": \"Say \\\\\\\"Hi\\\\\\\"\",\n   \"Content\": \"a \\\\\\\"quoted\\\\\\\" word\"\n  }\n",
            " ]\n",
            "}\n",
        );
        let mut doc = WikiDocument::from_json(text).unwrap();
        assert_eq!(doc.pages(PageType::Other)[0].name, "Say \\\"Hi\\\"");
        assert_eq!(doc.to_json().unwrap(), text);

        let rows = json_to_csv(&doc, Vec::new())
            .unwrap()
            .resolve_orphans(false)
            .unwrap();
        let reread = read_flat(&write_flat(&rows).unwrap()).unwrap();

        let sync = csv_to_json(&mut doc, &reread).unwrap();
        assert!(sync.is_unchanged(), "unexpected updates: {:?}", sync.updated);
        assert_eq!(doc.to_json().unwrap(), text);

        let again = json_to_csv(&doc, reread).unwrap();
        assert!(again.orphans.is_empty());
    }

    #[test]
    fn test_unsorted_document_round_trip_sorts() {
        let mut doc = WikiDocument::from_json(
            r#"{"Parts": [{"Name": "Zap Gun"}, {"Name": "Arc Gun", "Content": "Zap"}]}"#,
        )
        .unwrap();
        let mut sorted = doc.clone();
        sorted.sort();

        let rows = json_to_csv(&doc, Vec::new()).unwrap().rows;
        let reread = read_flat(&write_flat(&rows).unwrap()).unwrap();
        let sync = csv_to_json(&mut doc, &reread).unwrap();

        assert!(sync.is_unchanged());
        assert_eq!(doc.to_json().unwrap(), sorted.to_json().unwrap());
        assert_eq!(doc.pages(PageType::Part)[0].name, "Arc Gun");
        assert!(doc.collection(PageType::Bot).is_none());
    }

    #[test]
    fn test_seed_into_absent_collection_is_fatal() {
        let mut doc = WikiDocument::from_json(r#"{"Bots": []}"#).unwrap();
        let parts = json!([{"Name": "Ion Engine"}]);
        assert!(matches!(
            seed_pages(&mut doc, None, Some(&parts)),
            Err(WikiError::MissingCollection { .. })
        ));
    }

    #[test]
    fn test_seed_pages() {
        let mut doc = sample_doc();
        let bots = json!([{"Name": "Grunt"}, {"Name": "Watcher"}]);
        let parts = json!({"Ion Engine": {"Name": "Ion Engine"}, "Assault Rifle": {"Name": "Assault Rifle"}});

        let report = seed_pages(&mut doc, Some(&bots), Some(&parts)).unwrap();
        assert_eq!(report.bots, vec!["Watcher".to_string()]);
        assert_eq!(report.parts, vec!["Assault Rifle".to_string()]);
        assert_eq!(doc.pages(PageType::Part)[0].name, "Assault Rifle");
        assert_eq!(doc.pages(PageType::Part)[0].content, None);
    }

    #[test]
    fn test_seed_requires_names() {
        let mut doc = WikiDocument::default();
        let bots = json!([{"Class": "Grunt"}]);
        assert!(matches!(
            seed_pages(&mut doc, Some(&bots), None),
            Err(WikiError::MissingName { index: 0, .. })
        ));
    }

    #[test]
    fn test_bootstrap_accepts_every_type() {
        let mut group = row("Hunters", "Bot Group", "Hunt");
        group.bots = "Hunter".to_string();
        let rows = vec![row("Grunt", "Bot", "Basic"), group, row("Intro", "Other", "Hi\\nthere")];

        let doc = bootstrap(&rows).unwrap();
        assert!(doc.collection(PageType::Location).is_some());
        assert_eq!(doc.pages(PageType::Bot)[0].name, "Grunt");
        assert_eq!(doc.pages(PageType::BotGroup)[0].bots, Some(vec!["Hunter".to_string()]));
        assert_eq!(doc.pages(PageType::Other)[0].content.as_deref(), Some("Hi\nthere"));
    }
}
