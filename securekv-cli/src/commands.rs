use std::io::Write;
use std::path::PathBuf;

use eyre::{eyre, WrapErr};
use securekv_core::{FileStore, SecureStorage, SecureStore, StorePaths};

use crate::cli::{Cli, Command};

type Storage = SecureStorage<Box<dyn SecureStore>>;

fn store_root(cli: &Cli) -> eyre::Result<PathBuf> {
    cli.root
        .clone()
        .or_else(dirs::data_dir)
        .ok_or_else(|| eyre!("could not determine a data directory, pass --root"))
}

fn open_storage(cli: &Cli) -> eyre::Result<Storage> {
    #[cfg(all(target_vendor = "apple", feature = "platform-apple"))]
    if cli.keychain {
        tracing::debug!("using the system keychain");
        return Ok(SecureStorage::with_config(
            Box::new(securekv_core::apple::AppleKeychainStore::new()),
            cli.config(),
        ));
    }

    #[cfg(feature = "platform-keyring")]
    if let Some(label) = &cli.keyring {
        let store = securekv_core::KeyringStore::open(label.as_str())
            .wrap_err_with(|| format!("failed to open credential table '{label}'"))?;
        tracing::debug!(label = %label, "using the platform credential service");
        return Ok(SecureStorage::with_config(Box::new(store), cli.config()));
    }

    let root = store_root(cli)?;
    let store = FileStore::open(StorePaths::new(&root))
        .wrap_err_with(|| format!("failed to open store under {}", root.display()))?;
    tracing::debug!(path = %store.paths().store_path().display(), "using file store");
    Ok(SecureStorage::with_config(Box::new(store), cli.config()))
}

/// Runs the selected command, printing results to `out`.
pub fn execute(cli: &Cli, out: &mut impl Write) -> eyre::Result<()> {
    let storage = open_storage(cli)?;
    let options = cli.options();

    match &cli.command {
        Command::Read { key } => match storage.read(key, &options)? {
            Some(value) => writeln!(out, "{value}")?,
            None => tracing::info!(key = %key, "no value stored"),
        },
        Command::Write { key, value } => {
            storage.write(key, value, &options)?;
            tracing::info!(key = %key, "stored");
        }
        Command::Delete { key } => {
            storage.delete(key, &options)?;
            tracing::info!(key = %key, "deleted");
        }
        Command::DeleteAll => {
            storage.delete_all(&options)?;
            tracing::info!(namespace = ?options.namespace, "deleted all");
        }
        Command::ReadAll => {
            let all = storage.read_all(&options)?;
            serde_json::to_writer_pretty(&mut *out, &all)?;
            writeln!(out)?;
        }
        Command::Contains { key } => {
            writeln!(out, "{}", storage.contains_key(key, &options)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::Path;

    use clap::{CommandFactory, Parser};

    use super::*;

    fn run(root: &Path, args: &[&str]) -> eyre::Result<String> {
        let root = root.to_str().expect("utf-8 path");
        let cli = Cli::try_parse_from(
            ["securekv", "--root", root, "--namespace", "cli-test"]
                .iter()
                .chain(args),
        )?;
        let mut out = Vec::new();
        execute(&cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_write_read_delete() {
        let dir = tempfile::tempdir().expect("tempdir");
        run(dir.path(), &["write", "token", "abc"]).expect("write");
        assert_eq!(run(dir.path(), &["read", "token"]).expect("read"), "abc\n");
        assert_eq!(
            run(dir.path(), &["contains", "token"]).expect("contains"),
            "true\n"
        );

        run(dir.path(), &["delete", "token"]).expect("delete");
        assert_eq!(
            run(dir.path(), &["contains", "token"]).expect("contains"),
            "false\n"
        );
        assert_eq!(run(dir.path(), &["read", "token"]).expect("read"), "");
    }

    #[test]
    fn test_read_of_missing_key_succeeds_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(run(dir.path(), &["read", "never-written"]).expect("read"), "");
        assert_eq!(run(dir.path(), &["read-all"]).expect("read-all").trim(), "{}");
    }

    #[cfg(feature = "platform-keyring")]
    #[test]
    fn test_keyring_flag_takes_optional_label() {
        let bare = Cli::try_parse_from(["securekv", "--keyring", "read-all"]).expect("parse");
        assert_eq!(bare.keyring.as_deref(), Some(securekv_core::DEFAULT_LABEL));

        let named =
            Cli::try_parse_from(["securekv", "read-all", "--keyring=work"]).expect("parse");
        assert_eq!(named.keyring.as_deref(), Some("work"));

        let unset = Cli::try_parse_from(["securekv", "read-all"]).expect("parse");
        assert_eq!(unset.keyring, None);
    }

    #[test]
    fn test_read_all_prints_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        run(dir.path(), &["write", "a", "1"]).expect("write");
        run(dir.path(), &["write", "b", "2", "--accessibility", "passcode"]).expect("write");

        let printed = run(dir.path(), &["read-all"]).expect("read-all");
        let all: BTreeMap<String, String> = serde_json::from_str(&printed).expect("json");
        assert_eq!(all.len(), 2);
        assert_eq!(all["b"], "2");

        run(dir.path(), &["delete-all"]).expect("delete-all");
        assert_eq!(run(dir.path(), &["read-all"]).expect("read-all").trim(), "{}");
    }

    #[test]
    fn test_global_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "securekv",
            "contains",
            "k",
            "--access-group",
            "TEAM.shared",
            "--synchronizable",
            "true",
            "--strict-decode",
        ])
        .expect("parse");
        let options = cli.options();
        assert_eq!(options.access_group.as_deref(), Some("TEAM.shared"));
        assert_eq!(options.synchronizable, Some(true));
        assert_eq!(options.namespace, None);
        assert_eq!(
            cli.config().read_all_decode,
            securekv_core::DecodePolicy::Fail
        );
    }
}
