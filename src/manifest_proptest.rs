//! Property-based tests for manifest parsing and entry selection.

#[cfg(test)]
mod proptest_tests {
    use crate::dispatch::{select, Selection};
    use crate::manifest::{parse, substitute, ManifestEntry, PlatformFilter, Revision};
    use crate::options::{BuildMode, Variables};
    use crate::platform::HostOs;
    use proptest::prelude::*;
    use std::path::Path;

    fn host_os() -> impl Strategy<Value = HostOs> {
        prop_oneof![
            Just(HostOs::Linux),
            Just(HostOs::Windows),
            Just(HostOs::MacOs)
        ]
    }

    fn build_mode() -> impl Strategy<Value = BuildMode> {
        prop_oneof![
            Just(BuildMode::BuildOnly),
            Just(BuildMode::RuntimeOnly)
        ]
    }

    proptest! {
        /// Property: text without `${` is returned unchanged
        #[test]
        fn substitute_is_identity_without_references(line in "[^$]*") {
            let vars = Variables::new();
            prop_assert_eq!(substitute(&line, &vars).unwrap(), line);
        }

        /// Property: a defined variable is always replaced by its value
        #[test]
        fn substitute_replaces_defined_variable(
            name in "[A-Z_][A-Z0-9_]{0,8}",
            value in "[a-z0-9./:-]{0,20}",
            prefix in "[a-z ]{0,10}",
        ) {
            let mut vars = Variables::new();
            vars.insert(name.clone(), value.clone());
            let line = format!("{}${{{}}}/tail", prefix, name);
            prop_assert_eq!(
                substitute(&line, &vars).unwrap(),
                format!("{}{}/tail", prefix, value)
            );
        }

        /// Property: entries whose tags name neither the host nor `all` are
        /// never selected, whatever the build mode
        #[test]
        fn other_platform_never_selected(
            tags in prop::collection::vec("[a-z]{1,8}", 1..4),
            os in host_os(),
            mode in build_mode(),
        ) {
            prop_assume!(!tags.iter().any(|t| t == "all" || t == os.tag()));
            let entry = ManifestEntry {
                platforms: PlatformFilter::parse(&tags.join(",")),
                url: "include".to_string(),
                destination: "lib".to_string(),
                revision: Revision::Trunk,
                line: 1,
            };
            prop_assert_eq!(select(&entry, os, mode), Selection::OtherPlatform);
        }

        /// Property: every well-formed line parses to exactly one entry with
        /// its fields intact
        #[test]
        fn well_formed_lines_round_trip_fields(
            url in "[a-z]{3,6}://[a-z]{1,10}/[a-z]{1,10}",
            dest in "[a-z][a-z0-9_/]{0,12}",
            rev in "[0-9]{1,6}|trunk",
        ) {
            let content = format!("all {} {} {}\n", url, dest, rev);
            let entries = parse(&content, &Variables::new(), Path::new("modules.txt")).unwrap();
            prop_assert_eq!(entries.len(), 1);
            prop_assert_eq!(&entries[0].url, &url);
            prop_assert_eq!(&entries[0].destination, &dest);
            prop_assert_eq!(entries[0].revision.to_string(), rev);
        }
    }
}
