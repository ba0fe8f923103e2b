//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use posixutils_gettextpo::po_lib::header;
use posixutils_gettextpo::{Catalog, Error, Message, PoEntry, Severity, UsageError, WriteOptions};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use test_log::test;

/// Create a temporary .po file for testing
fn create_temp_po_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let po_path = temp_dir.path().join("test.po");
    let mut file = File::create(&po_path).unwrap();
    write!(file, "{}", content).unwrap();
    (temp_dir, po_path)
}

const SAMPLE: &str = r#"# German translations for demo.
msgid ""
msgstr ""
"Project-Id-Version: demo 1.0\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

#. TRANSLATORS: greeting
#: src/main.c:10
#, c-format
msgid "Hello, %s!"
msgstr "Hallo, %s!"

#: src/main.c:20
#, c-format
msgid "%d file"
msgid_plural "%d files"
msgstr[0] "%d Datei"
msgstr[1] "%d Dateien"

#, fuzzy
#| msgid "Old text"
msgctxt "menu"
msgid "Open"
msgstr "Öffnen"

#~ msgid "Removed"
#~ msgstr "Entfernt"
"#;

#[test]
fn test_read_file() {
    let (_dir, path) = create_temp_po_file(SAMPLE);
    let catalog = Catalog::read(&path).unwrap();

    assert_eq!(catalog.domains(), vec!["messages"]);
    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog.charset(None).as_deref(), Some("UTF-8"));
    assert_eq!(
        catalog.plural_forms(None).as_deref(),
        Some("nplurals=2; plural=(n != 1);")
    );

    let messages: Vec<Message> = catalog.iterate(None).collect();
    assert_eq!(messages[0].msgid().as_deref(), Some(""));
    assert_eq!(messages[0].comments(), "German translations for demo.\n");

    let hello = &messages[1];
    assert_eq!(hello.extracted_comments(), "TRANSLATORS: greeting\n");
    assert_eq!(hello.references(), vec!["src/main.c:10"]);
    assert!(hello.is_format("c-format"));
    assert!(hello.check_format().is_ok());
    let origin = hello.origin().unwrap();
    assert_eq!(origin.file.as_deref(), path.to_str());
    assert_eq!(origin.line, 11);

    let plural = &messages[2];
    assert_eq!(plural.msgstr_plural(), vec!["%d Datei", "%d Dateien"]);

    let open = &messages[3];
    assert!(open.is_fuzzy());
    assert_eq!(open.msgctxt().as_deref(), Some("menu"));
    assert_eq!(open.previous_msgid().as_deref(), Some("Old text"));
    assert_eq!(open.msgstr().as_deref(), Some("Öffnen"));

    assert!(messages[4].is_obsolete());
    assert!(catalog.check_all().is_ok());
}

#[test]
fn test_read_missing_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = Catalog::read(dir.path().join("missing.po")).unwrap_err();
    let report = err.report().unwrap();
    assert!(report.is_fatal());
    assert_eq!(report.len(), 1);
    assert!(!err.to_string().is_empty());
    assert!(err.to_string().starts_with("cannot open file"));
}

#[test]
fn test_read_reports_every_error() {
    let (_dir, path) = create_temp_po_file(
        "msgid \"a\"\nmsgstr \"unterminated\n\nmsgid \"b\"\nmsgstr \"\\q\"\n",
    );
    let err = Catalog::read(&path).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));

    let report = err.report().unwrap();
    assert!(!report.is_fatal());
    let lines: Vec<usize> = report
        .diagnostics()
        .iter()
        .map(|d| d.location.as_ref().unwrap().line)
        .collect();
    assert_eq!(lines, vec![2, 5]);
    assert_eq!(
        err.to_string(),
        "end-of-line within string\ninvalid control sequence"
    );
}

#[test]
fn test_read_invalid_utf8_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.po");
    fs::write(&path, b"msgid \"caf\xe9\"\nmsgstr \"\"\n").unwrap();

    let err = Catalog::read(&path).unwrap_err();
    let report = err.report().unwrap();
    assert!(report.is_fatal());
    assert_eq!(report.diagnostics()[0].severity, Severity::Fatal);
}

#[test]
fn test_read_from_reader() {
    let catalog = Catalog::read_from(SAMPLE.as_bytes(), "stdin").unwrap();
    let first = catalog.iterate(None).nth(1).unwrap();
    assert_eq!(first.origin().unwrap().file.as_deref(), Some("stdin"));
}

#[test]
fn test_two_domains() {
    let catalog = Catalog::parse(
        "domain \"foo\"\nmsgid \"x\"\nmsgstr \"X\"\n\ndomain \"bar\"\nmsgid \"y\"\nmsgstr \"Y\"\n",
    )
    .unwrap();
    assert_eq!(catalog.domains(), vec!["foo", "bar"]);

    let in_bar: Vec<_> = catalog.iterate(Some("bar")).filter_map(|m| m.msgid()).collect();
    assert_eq!(in_bar, vec!["y"]);
    assert!(catalog.iterate(Some("messages")).next().is_none());
    assert!(catalog.iterate(None).count() == 2);
}

#[test]
fn test_write_round_trip() {
    let (dir, path) = create_temp_po_file(SAMPLE);
    let catalog = Catalog::read(&path).unwrap();

    let out = dir.path().join("out.po");
    catalog.write(&out).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("#~ msgid \"Removed\"\n"));
    assert!(text.contains("#, fuzzy\n#| msgid \"Old text\"\nmsgctxt \"menu\"\n"));

    let again = Catalog::read(&out).unwrap();
    let before: Vec<PoEntry> = catalog.iterate(None).map(|m| m.entry()).collect();
    let after: Vec<PoEntry> = again.iterate(None).map(|m| m.entry()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_modify_and_write() {
    let (dir, path) = create_temp_po_file(SAMPLE);
    let catalog = Catalog::read(&path).unwrap();

    let hello = catalog.iterate(None).nth(1).unwrap();
    hello.set_msgstr("Servus, %s!");
    hello.set_fuzzy(true);

    let mut iter = catalog.iterate(None);
    iter.next();
    let added = Message::new();
    added.set_msgid("Bye");
    added.set_msgstr("Tschüss");
    added.add_reference("src/main.c", Some(30));
    iter.insert(&added).unwrap();

    let out = dir.path().join("out.po");
    catalog.write(&out).unwrap();
    let again = Catalog::read(&out).unwrap();
    let msgids: Vec<String> = again.iterate(None).filter_map(|m| m.msgid()).collect();
    assert_eq!(msgids, vec!["", "Bye", "Hello, %s!", "%d file", "Open", "Removed"]);

    let hello = again.iterate(None).nth(2).unwrap();
    assert_eq!(hello.msgstr().as_deref(), Some("Servus, %s!"));
    assert!(hello.is_fuzzy());
}

#[test]
fn test_write_failure_leaves_no_file() {
    let catalog = Catalog::new();
    let mut iter = catalog.iterate(None);
    iter.insert(&Message::new()).unwrap();

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.po");
    let err = catalog.write(&out).unwrap_err();
    assert!(matches!(err, Error::Write(_)));
    assert_eq!(err.to_string(), "message has no 'msgid'");
    assert!(!out.exists());
}

#[test]
fn test_write_to_missing_directory_is_fatal() {
    let catalog = Catalog::parse("msgid \"a\"\nmsgstr \"b\"\n").unwrap();
    let dir = TempDir::new().unwrap();
    let err = catalog
        .write(dir.path().join("no/such/dir/out.po"))
        .unwrap_err();
    assert!(err.report().unwrap().is_fatal());
}

#[test]
fn test_write_options() {
    let long = "lorem ipsum ".repeat(10);
    let catalog = Catalog::new();
    let message = Message::new();
    message.set_msgid(long.trim_end());
    message.set_msgstr("");
    catalog.iterate(None).insert(&message).unwrap();

    let wrapped = catalog.to_po_string(&WriteOptions::default()).unwrap();
    assert!(wrapped.starts_with("msgid \"\"\n"));

    let narrow = WriteOptions {
        width: 40,
        wrap: true,
    };
    let text = catalog.to_po_string(&narrow).unwrap();
    assert!(text.lines().all(|l| l.chars().count() <= 40));

    let unwrapped = WriteOptions {
        width: 40,
        wrap: false,
    };
    let text = catalog.to_po_string(&unwrapped).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn test_ownership_transfer() {
    let source = Catalog::parse("msgid \"a\"\nmsgstr \"A\"\n").unwrap();
    let message = source.iterate(None).next().unwrap();

    let target = Catalog::new();
    let result = target.iterate(None).insert(&message);
    assert!(matches!(result, Err(Error::Usage(UsageError::AlreadyOwned))));

    drop(source);
    target.iterate(None).insert(&message).unwrap();
    assert_eq!(target.len(), 1);
}

#[test]
fn test_check_all_reports_with_locations() {
    let (_dir, path) = create_temp_po_file(
        r#"msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

#, c-format
msgid "%s and %s"
msgstr "%s"

#, c-format
msgid "%d item"
msgid_plural "%d items"
msgstr[0] "%d Ding"
msgstr[1] "%d Dinge"
msgstr[2] "%d Dinger"
"#,
    );
    let catalog = Catalog::read(&path).unwrap();
    let err = catalog.check_all().unwrap_err();
    assert!(matches!(err, Error::Check(_)));

    let report = err.report().unwrap();
    let found: Vec<(usize, &str)> = report
        .diagnostics()
        .iter()
        .map(|d| (d.location.as_ref().unwrap().line, d.message.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            (
                7,
                "number of format specifications in 'msgid' and 'msgstr' does not match"
            ),
            (11, "number of plural translations (3) does not match nplurals = 2"),
        ]
    );
}

#[test]
fn test_check_format_error_list() {
    let message = Message::new();
    message.set_msgid("Spec 1: %s, Spec 2: %d");
    message.set_msgstr("Spec 1: %d, Spec 2: %s");
    message.set_format("c-format", true);

    let err = message.check_format().unwrap_err();
    let report = err.report().unwrap();
    assert_eq!(report.len(), 2);
    assert!(report
        .diagnostics()
        .iter()
        .all(|d| d.severity == Severity::Error && d.location.is_none()));
    assert_eq!(
        err.to_string(),
        "format specifications in 'msgid' and 'msgstr' for argument 1 are not the same\n\
         format specifications in 'msgid' and 'msgstr' for argument 2 are not the same"
    );
}

#[test]
fn test_check_format_skips_untranslated() {
    let message = Message::new();
    message.set_msgid("Hello %s");
    message.set_format("c-format", true);
    assert!(message.check_format().is_ok());

    message.set_msgstr("");
    assert!(message.check_format().is_ok());

    let message = Message::new();
    message.set_msgid("");
    message.set_msgstr("%d");
    message.set_format("c-format", true);
    assert!(message.check_format().is_ok());
}

#[test]
fn test_unicode_strings() {
    let message = Message::new();
    message.set_msgid("Carlos Perelló Marín");
    message.set_msgstr("Carlos Perelló Marín");
    assert_eq!(message.msgid().as_deref(), Some("Carlos Perelló Marín"));

    let catalog = Catalog::new();
    catalog.iterate(None).insert(&message).unwrap();
    let text = catalog.to_po_string(&WriteOptions::default()).unwrap();
    assert!(text.contains("msgstr \"Carlos Perelló Marín\""));
}

#[test]
fn test_edit_header() {
    let catalog = Catalog::parse(SAMPLE).unwrap();
    let header_message = catalog.iterate(None).next().unwrap();
    let header = catalog.domain_header(None).unwrap();
    assert_eq!(header_message.msgstr().as_deref(), Some(header.as_str()));

    let updated = header::set_header_field(&header, "Plural-Forms", "nplurals=1; plural=0;");
    let updated = header::set_header_field(&updated, "Language", "de");
    header_message.set_msgstr(updated);

    assert_eq!(
        catalog.plural_forms(None).as_deref(),
        Some("nplurals=1; plural=0;")
    );
    let header = catalog.domain_header(None).unwrap();
    assert_eq!(header::header_field(&header, "Language").as_deref(), Some("de"));
    assert!(header.ends_with("Language: de\n"));
}

#[test]
fn test_plural_message_keeps_its_forms() {
    let catalog = Catalog::new();
    let message = Message::new();
    message.set_msgid("file");
    message.set_msgid_plural("files");
    message.set_msgstr("Datei");
    message.set_msgstr_plural(0, "Datei").unwrap();
    catalog.iterate(None).insert(&message).unwrap();

    let err = catalog.to_po_string(&WriteOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Write(_)));
    assert_eq!(
        err.to_string(),
        "message has 'msgid_plural' but a singular 'msgstr'"
    );

    message.clear_msgstr();
    message.set_msgstr_plural(1, "Dateien").unwrap();
    let text = catalog.to_po_string(&WriteOptions::default()).unwrap();
    let again = Catalog::parse(&text).unwrap();
    let entries: Vec<PoEntry> = again.iterate(None).map(|m| m.entry()).collect();
    assert_eq!(entries, vec![message.entry()]);
}

#[test]
fn test_huge_values_are_errors() {
    let err = Catalog::parse("msgid \"a\"\nmsgid_plural \"as\"\nmsgstr[18446744073709551615] \"x\"\n")
        .unwrap_err();
    assert_eq!(err.to_string(), "plural form has wrong index");

    let catalog = Catalog::parse(
        "msgid \"\"\nmsgstr \"Content-Type: text/plain; charset=UTF-8\\n\"\n\"Plural-Forms: nplurals=18446744073709551615; plural=0;\\n\"\n",
    )
    .unwrap();
    let err = catalog.check_all().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid Plural-Forms: invalid value for 'nplurals' attribute"
    );

    let message = Message::new();
    message.set_msgid("file");
    message.set_msgid_plural("files");
    assert!(matches!(
        message.set_msgstr_plural(usize::MAX, "x"),
        Err(Error::Usage(UsageError::PluralIndexOutOfRange(_)))
    ));
}

mod properties {
    use posixutils_gettextpo::{Catalog, Message, PoEntry, WriteOptions};
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("Hello %s %d %g", "Bye %s %.2d %f", true)]
    #[case("%s and %s", "%s y %s", true)]
    #[case("%s and %s", "%s", false)]
    #[case("No format specifiers", "One format specifier: %20s", false)]
    #[case("Spec 1: %s, Spec 2: %d", "Spec 1: %d, Spec 2: %s", false)]
    fn test_check_format(#[case] msgid: &str, #[case] msgstr: &str, #[case] ok: bool) {
        let message = Message::new();
        message.set_msgid(msgid);
        message.set_msgstr(msgstr);
        message.set_format("c-format", true);
        assert_eq!(message.check_format().is_ok(), ok);

        message.set_format("c-format", false);
        assert!(message.check_format().is_ok());
    }

    fn arb_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                "[a-zA-Z0-9 .,:;!?%-]{1,12}",
                Just("\n".to_string()),
                Just("\t".to_string()),
                Just("\\".to_string()),
                Just("\"".to_string()),
                Just("äöü€".to_string()),
            ],
            0..8,
        )
        .prop_map(|parts| parts.concat())
    }

    fn arb_word() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_./:-]{0,15}"
    }

    fn arb_comments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(
            prop_oneof![Just(String::new()), "[a-zA-Z0-9 ,.]{1,20}"],
            0..3,
        )
    }

    /// Previous msgctxt, msgid and msgid_plural
    type Previous = (Option<String>, Option<String>, Option<String>);

    fn arb_previous() -> impl Strategy<Value = Previous> {
        (
            prop::option::of(arb_text()),
            prop::option::of(arb_text()),
            prop::option::of(arb_text()),
        )
    }

    fn arb_entry(index: usize) -> impl Strategy<Value = PoEntry> {
        let comments = (
            arb_comments(),
            arb_comments(),
            prop::collection::vec(arb_word(), 0..4),
        );
        let flags = (
            any::<bool>(),
            prop::option::of(any::<bool>()),
            prop::sample::subsequence(vec!["no-wrap", "range: 1..5"], 0..=2),
            any::<bool>(),
        );
        let strings = (
            prop::option::of(arb_text()),
            arb_text(),
            prop::option::of(arb_text()),
            prop::collection::vec(arb_text(), 1..4),
            arb_text(),
        );
        (comments, flags, arb_previous(), strings).prop_map(
            move |(
                (translator, extracted, references),
                (fuzzy, c_format, other_flags, obsolete),
                (previous_msgctxt, previous_msgid, previous_msgid_plural),
                (msgctxt, msgid, msgid_plural, plural_forms, msgstr),
            )| {
                let mut entry = PoEntry {
                    translator_comments: translator,
                    extracted_comments: extracted,
                    references,
                    fuzzy,
                    formats: c_format
                        .map(|enabled| ("c-format".to_string(), enabled))
                        .into_iter()
                        .collect(),
                    flags: other_flags.into_iter().map(str::to_string).collect(),
                    previous_msgctxt,
                    previous_msgid,
                    previous_msgid_plural,
                    msgctxt,
                    // the index keeps msgids unique and non-empty
                    msgid: Some(format!("{}#{}", msgid, index)),
                    obsolete,
                    ..PoEntry::default()
                };
                match msgid_plural {
                    Some(plural) => {
                        entry.msgid_plural = Some(plural);
                        entry.msgstr_plural = plural_forms;
                    }
                    None => entry.msgstr = Some(msgstr),
                }
                entry
            },
        )
    }

    fn arb_entries() -> impl Strategy<Value = Vec<PoEntry>> {
        (1usize..6).prop_flat_map(|count| (0..count).map(arb_entry).collect::<Vec<_>>())
    }

    /// Domains in file order, each with its entries
    fn arb_domains() -> impl Strategy<Value = Vec<(String, Vec<PoEntry>)>> {
        prop::sample::subsequence(vec!["messages", "alpha", "beta"], 1..=3).prop_flat_map(
            |names| {
                names
                    .into_iter()
                    .map(|name| arb_entries().prop_map(move |entries| (name.to_string(), entries)))
                    .collect::<Vec<_>>()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_write_then_parse_is_identity(domains in arb_domains(), width in 20usize..100) {
            let catalog = Catalog::new();
            for (name, entries) in &domains {
                let mut iter = catalog.iterate(Some(name));
                for entry in entries {
                    iter.insert(&Message::from_entry(entry.clone())).unwrap();
                }
            }

            let options = WriteOptions { width, wrap: true };
            let text = catalog.to_po_string(&options).unwrap();
            let parsed = Catalog::parse(&text).unwrap();

            let names: Vec<String> = domains.iter().map(|(name, _)| name.clone()).collect();
            prop_assert_eq!(parsed.domains(), names);
            for (name, entries) in &domains {
                let again: Vec<PoEntry> = parsed.iterate(Some(name)).map(|m| m.entry()).collect();
                prop_assert_eq!(&again, entries);
            }
        }
    }
}
