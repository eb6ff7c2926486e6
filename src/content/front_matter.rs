use serde_yaml::{Mapping, Value};

use crate::content::FrontMatter;
use crate::lint::{Issue, Rule};
use crate::text_utils::parse_post_date;

pub const REQUIRED_KEYS: [&str; 5] = ["title", "date", "categories", "tags", "layout"];
pub const KNOWN_KEYS: [&str; 7] = ["title", "date", "categories", "tags", "toc", "layout", "author"];

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn line_of(header: &str, header_line: usize, key: &str) -> Option<usize> {
    super::parsing_utils::key_line(header, key).map(|l| header_line + l)
}

fn wrong_type(key: &str, expected: &str, value: &Value, line: Option<usize>) -> Issue {
    Issue::new(Rule::WrongType, line,
               format!("'{}' must be {}, found {}", key, expected, value_kind(value)))
}

fn string_list(key: &str, value: &Value, line: Option<usize>, issues: &mut Vec<Issue>) -> Option<Vec<String>> {
    let Value::Sequence(items) = value else {
        issues.push(wrong_type(key, "a list of strings", value, line));
        return None;
    };

    let mut list = vec![];
    for item in items {
        match item {
            Value::String(s) => list.push(s.clone()),
            other => issues.push(Issue::new(Rule::WrongType, line,
                                            format!("'{}' items must be strings, found {}", key, value_kind(other)))),
        }
    }
    Some(list)
}

fn read_mapping(mapping: &Mapping, header: &str, header_line: usize, issues: &mut Vec<Issue>) -> FrontMatter {
    let mut front_matter = FrontMatter::default();

    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            issues.push(Issue::new(Rule::WrongType, None,
                                   format!("front matter keys must be strings, found {}", value_kind(key))));
            continue;
        };
        front_matter.keys.push(key.to_string());
        let line = line_of(header, header_line, key);
        if let Some(line) = line {
            front_matter.lines.insert(key.to_string(), line);
        }

        match key {
            "title" | "layout" | "author" => {
                let Value::String(s) = value else {
                    issues.push(wrong_type(key, "a string", value, line));
                    front_matter.invalid.push(key.to_string());
                    continue;
                };
                match key {
                    "title" => front_matter.title = Some(s.clone()),
                    "layout" => front_matter.layout = Some(s.clone()),
                    _ => front_matter.author = Some(s.clone()),
                }
            }
            "date" => {
                let Value::String(s) = value else {
                    issues.push(wrong_type(key, "a date string", value, line));
                    front_matter.invalid.push(key.to_string());
                    continue;
                };
                match parse_post_date(s) {
                    Ok(date) => front_matter.date = Some(date),
                    Err(e) => {
                        issues.push(Issue::new(Rule::InvalidDate, line, e));
                        front_matter.invalid.push(key.to_string());
                    }
                }
            }
            "categories" | "tags" => {
                let Some(list) = string_list(key, value, line, issues) else {
                    front_matter.invalid.push(key.to_string());
                    continue;
                };
                if key == "categories" {
                    front_matter.categories = list;
                } else {
                    front_matter.tags = list;
                }
            }
            "toc" => match value {
                Value::Bool(toc) => front_matter.toc = *toc,
                other => {
                    issues.push(wrong_type(key, "true or false", other, line));
                    front_matter.invalid.push(key.to_string());
                }
            },
            _ => {}
        }
    }

    for key in REQUIRED_KEYS {
        if !front_matter.keys.iter().any(|k| k == key) {
            issues.push(Issue::new(Rule::MissingKey, None, format!("required key '{}' is missing", key)));
        }
    }

    front_matter
}

/// Parses the YAML header. `None` means the header is not usable at all (bad YAML
/// or not a mapping); otherwise the typed fields are filled as far as possible and
/// the problems found are returned next to them.
pub fn parse_front_matter(header: &str, header_line: usize) -> (Option<FrontMatter>, Vec<Issue>) {
    let mut issues = vec![];

    let value: Value = match serde_yaml::from_str(header) {
        Ok(value) => value,
        Err(e) => {
            let line = e.location().map(|loc| header_line + loc.line() - 1);
            issues.push(Issue::new(Rule::InvalidYaml, line, format!("front matter is not valid YAML: {}", e)));
            return (None, issues);
        }
    };

    let front_matter = match value {
        Value::Mapping(ref mapping) => read_mapping(mapping, header, header_line, &mut issues),
        Value::Null => read_mapping(&Mapping::new(), header, header_line, &mut issues),
        other => {
            issues.push(Issue::new(Rule::FrontMatterNotMapping, Some(header_line),
                                   format!("front matter must be a mapping of keys, found {}", value_kind(&other))));
            return (None, issues);
        }
    };

    (Some(front_matter), issues)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn rules_of(issues: &[Issue]) -> Vec<Rule> {
        issues.iter().map(|i| i.rule).collect()
    }

    #[test]
    fn test_complete_header() {
        let header = "layout: post\ntitle: Pub/Sub\ndate: 2024-02-10\ncategories: [Messaging]\ntags: [kafka]\ntoc: false\nauthor: Jane\n";
        let (front_matter, issues) = parse_front_matter(header, 2);
        assert!(issues.is_empty(), "{:?}", issues);

        let front_matter = front_matter.unwrap();
        assert_eq!(front_matter.title.as_deref(), Some("Pub/Sub"));
        assert_eq!(front_matter.date.unwrap().day(), NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert_eq!(front_matter.categories, ["Messaging"]);
        assert_eq!(front_matter.tags, ["kafka"]);
        assert!(!front_matter.toc);
        assert_eq!(front_matter.author.as_deref(), Some("Jane"));
        assert_eq!(front_matter.keys, ["layout", "title", "date", "categories", "tags", "toc", "author"]);
        assert_eq!(front_matter.line_of("layout"), Some(2));
        assert_eq!(front_matter.line_of("author"), Some(8));
    }

    #[test]
    fn test_missing_keys() {
        let (front_matter, issues) = parse_front_matter("title: Only a title\n", 2);
        assert!(front_matter.is_some());
        assert_eq!(rules_of(&issues), [Rule::MissingKey; 4]);
        assert!(issues.iter().any(|i| i.message.contains("'layout'")));
    }

    #[test]
    fn test_empty_header_is_empty_mapping() {
        let (front_matter, issues) = parse_front_matter("", 2);
        assert_eq!(front_matter.unwrap(), FrontMatter::default());
        assert_eq!(issues.len(), REQUIRED_KEYS.len());
    }

    #[test]
    fn test_wrong_types() {
        let header = "layout: post\ntitle: 42\ndate: 2024-02-10\ncategories: Messaging\ntags: [kafka, 3]\ntoc: yes please\n";
        let (front_matter, issues) = parse_front_matter(header, 2);
        let front_matter = front_matter.unwrap();

        assert_eq!(rules_of(&issues), [Rule::WrongType; 4]);
        assert_eq!(issues[0].line, Some(3));
        assert!(issues[0].message.contains("'title' must be a string, found a number"));
        assert!(issues[1].message.contains("'categories' must be a list of strings"));
        assert_eq!(front_matter.tags, ["kafka"]);
        assert!(front_matter.title.is_none());
        assert_eq!(front_matter.invalid, ["title", "categories", "toc"]);
    }

    #[test]
    fn test_invalid_date() {
        let header = "layout: post\ntitle: A\ndate: 2024-02-31\ncategories: []\ntags: []\n";
        let (front_matter, issues) = parse_front_matter(header, 2);
        assert!(front_matter.unwrap().date.is_none());
        assert_eq!(rules_of(&issues), [Rule::InvalidDate]);
        assert_eq!(issues[0].line, Some(4));
    }

    #[test]
    fn test_invalid_yaml() {
        let (front_matter, issues) = parse_front_matter("title: A\ntags: [unclosed\n", 2);
        assert!(front_matter.is_none());
        assert_eq!(rules_of(&issues), [Rule::InvalidYaml]);
        assert_eq!(issues[0].line, Some(4));
    }

    #[test]
    fn test_not_a_mapping() {
        let (front_matter, issues) = parse_front_matter("- just\n- a list\n", 2);
        assert!(front_matter.is_none());
        assert_eq!(rules_of(&issues), [Rule::FrontMatterNotMapping]);
    }
}
