use crate::errors::{Result, invalid_argument};
use crate::metadata::{Gender, Metadata};
use itertools::Itertools;

/// A metadata restriction `key = value`; `None` matches everything.
pub type Category<'a> = Option<(&'a str, &'a str)>;
pub type OCategory = Option<(String, String)>;

pub fn owned_cat(category: Category) -> OCategory {
    category.map(|(k, v)| (k.to_owned(), v.to_owned()))
}

/// Does `metadata` have the value of `category`?
///
/// Gender values are compared the way they are parsed, ignoring case.
pub fn matches(category: Category, metadata: &Metadata) -> bool {
    match category {
        None => true,
        Some(("author_gender", v)) => match v.parse::<Gender>() {
            Ok(g) => metadata.author_gender == Some(g),
            Err(_) => false,
        },
        Some((k, v)) => match metadata.get(k) {
            None => false,
            Some(v2) => v == v2,
        },
    }
}

pub fn parse_restriction(arg: &Option<String>) -> Result<Category> {
    match arg {
        None => Ok(None),
        Some(r) => {
            let parts = r.split('=').collect_vec();
            if parts.len() != 2 {
                return Err(invalid_argument(format!(
                    "restriction should be of the form 'key=value', got '{r}'"
                )));
            }
            let category = Some((parts[0], parts[1]));
            Ok(category)
        }
    }
}

pub fn pretty(category: Category) -> String {
    match category {
        None => "all documents".to_owned(),
        Some((k, v)) => format!("{k} = {v}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_ok() {
        let arg = Some("author_gender=female".to_owned());
        assert_eq!(
            parse_restriction(&arg).unwrap(),
            Some(("author_gender", "female"))
        );
        assert_eq!(parse_restriction(&None).unwrap(), None);
    }

    #[test]
    fn parse_bad() {
        assert!(parse_restriction(&Some("author_gender".to_owned())).is_err());
        assert!(parse_restriction(&Some("a=b=c".to_owned())).is_err());
    }

    #[test]
    fn matches_metadata() {
        let md = Metadata {
            author_gender: Some(Gender::Male),
            date: Some(1850),
            ..Metadata::default()
        };
        assert!(matches(None, &md));
        assert!(matches(Some(("author_gender", "male")), &md));
        assert!(matches(Some(("date", "1850")), &md));
        assert!(!matches(Some(("author_gender", "female")), &md));
        assert!(!matches(Some(("title", "x")), &md));
    }

    #[test]
    fn gender_ignores_case() {
        let md = Metadata {
            author_gender: Some(Gender::Female),
            ..Metadata::default()
        };
        assert!(matches(Some(("author_gender", "Female")), &md));
        assert!(matches(Some(("author_gender", " FEMALE")), &md));
        assert!(!matches(Some(("author_gender", "Male")), &md));
        assert!(!matches(Some(("author_gender", "woman")), &md));
        assert!(!matches(Some(("author_gender", "female")), &Metadata::default()));
    }
}
