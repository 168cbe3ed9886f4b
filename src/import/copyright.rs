use md5::{Digest, Md5};

use crate::models::{FileTarget, ImportContext, COPYRIGHT_STATEMENT_TYPE};
use crate::store::{FindingStore, StoreError};

/// Split a copyright block into trimmed, non-empty statements.
pub fn split_statements(block: &str) -> Vec<&str> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Lowercase hex MD5 of a statement, as stored alongside it.
pub fn statement_hash(statement: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(statement.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Write every statement of every block against every target.
pub fn save_copyrights<S>(
    store: &mut S,
    ctx: &ImportContext,
    blocks: &[String],
    targets: &[FileTarget],
) -> Result<usize, StoreError>
where
    S: FindingStore + ?Sized,
{
    let mut written = 0;
    for block in blocks {
        for statement in split_statements(block) {
            let hash = statement_hash(statement);
            for target in targets {
                store.insert_copyright_statement(
                    ctx.agent_id,
                    target.pfile_id,
                    statement,
                    &hash,
                    COPYRIGHT_STATEMENT_TYPE,
                )?;
                written += 1;
            }
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_split_drops_blank_lines() {
        assert_eq!(split_statements("Foo\n\nBar\n  \nBaz"), vec!["Foo", "Bar", "Baz"]);
    }

    #[test]
    fn test_split_trims_and_handles_crlf() {
        assert_eq!(
            split_statements("  (c) 2015 Siemens AG \r\n\r\n\tCopyright Jane Doe\r\n"),
            vec!["(c) 2015 Siemens AG", "Copyright Jane Doe"]
        );
        assert!(split_statements(" \n \n").is_empty());
    }

    #[test]
    fn test_statement_hash() {
        assert_eq!(statement_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(statement_hash("Foo"), "1356c67d7ad1638d816bfb822dd2c25d");
    }

    #[test]
    fn test_every_statement_on_every_target() {
        let mut store = MemoryStore::default();
        let ctx = ImportContext {
            agent_id: 9,
            group_id: 1,
            user_id: 1,
            job_id: 1,
        };
        let targets = vec![
            FileTarget { uploadtree_id: 1, pfile_id: 11 },
            FileTarget { uploadtree_id: 2, pfile_id: 12 },
        ];
        let blocks = vec!["Foo\n\nBar\n  \nBaz".to_string(), "Foo".to_string()];

        let written = save_copyrights(&mut store, &ctx, &blocks, &targets).unwrap();

        assert_eq!(written, 8);
        let rows: Vec<(&str, i64)> = store
            .copyrights()
            .iter()
            .map(|c| (c.content.as_str(), c.pfile_id))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Foo", 11),
                ("Foo", 12),
                ("Bar", 11),
                ("Bar", 12),
                ("Baz", 11),
                ("Baz", 12),
                ("Foo", 11),
                ("Foo", 12),
            ]
        );
        let first = &store.copyrights()[0];
        assert_eq!(first.statement_type, "statement");
        assert_eq!(first.agent_id, 9);
        assert_eq!(first.hash, statement_hash("Foo"));
    }
}
