//! Team import/export service
//!
//! Converts between the nested JSON record format and the member tree,
//! validating candidate data before it replaces the current team.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use generational_arena::Index;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::application::services::HierarchyStore;
use crate::application::validation::{self, FieldErrors};
use crate::application::{
    ApplicationError, ApplicationResult, IoResultExt, MemberInput, MemberRecord,
};
use crate::domain::{Member, MemberArena, MemberId};
use crate::infrastructure::traits::FileSystem;

/// Default upper bound for an import payload (1 MiB).
pub const DEFAULT_MAX_IMPORT_BYTES: u64 = 1024 * 1024;

/// Service for moving whole teams in and out of a [`HierarchyStore`].
pub struct TeamService {
    fs: Arc<dyn FileSystem>,
    max_import_bytes: u64,
}

impl TeamService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_limit(fs, DEFAULT_MAX_IMPORT_BYTES)
    }

    pub fn with_limit(fs: Arc<dyn FileSystem>, max_import_bytes: u64) -> Self {
        Self {
            fs,
            max_import_bytes,
        }
    }

    /// Validate and create a single member.
    ///
    /// Rejects missing/invalid fields and emails already in the team before
    /// anything is created.
    #[instrument(level = "debug", skip(self, store))]
    pub fn create_member(
        &self,
        store: &mut HierarchyStore,
        input: &MemberInput,
        manager_id: Option<MemberId>,
    ) -> ApplicationResult<MemberId> {
        let errors = input.validate();
        if !errors.is_empty() {
            return Err(ApplicationError::IncorrectStructure(errors));
        }
        let name = input.name.as_deref().unwrap_or_default().trim();
        let email = input.email.as_deref().unwrap_or_default().trim();
        if store.is_email_used(email) {
            return Err(ApplicationError::EmailInUse(email.to_string()));
        }
        Ok(store.create_member(name, email, manager_id)?.id())
    }

    /// Parse and validate a team without touching any store.
    #[instrument(level = "debug", skip_all, fields(bytes = text.len()))]
    pub fn parse_team(&self, text: &str) -> ApplicationResult<MemberArena> {
        let size = text.len() as u64;
        if size > self.max_import_bytes {
            return Err(ApplicationError::ImportTooLarge {
                size,
                limit: self.max_import_bytes,
            });
        }
        if text.trim().is_empty() {
            return Err(ApplicationError::EmptyImport);
        }
        let record = parse_record(text)?;
        debug!("parse_team: {} records", record.count());
        let tree = build_tree(&record)?;
        if !HierarchyStore::check_emails(&tree) {
            return Err(ApplicationError::IncorrectStructure(FieldErrors::single(
                "email",
                validation::EMAILS_DUPLICATED,
            )));
        }
        Ok(tree)
    }

    /// Replace the store's team with the one in `text`; returns the new root id.
    /// The store is untouched when validation fails.
    pub fn import_json(&self, store: &mut HierarchyStore, text: &str) -> ApplicationResult<MemberId> {
        let tree = self.parse_team(text)?;
        let root = tree
            .root()
            .and_then(|idx| tree.get(idx))
            .map(Member::id)
            .ok_or(ApplicationError::EmptyImport)?;
        store.set_root(tree);
        Ok(root)
    }

    #[instrument(level = "debug", skip(self, store))]
    pub fn import_file(&self, store: &mut HierarchyStore, path: &Path) -> ApplicationResult<MemberId> {
        let text = self
            .fs
            .read_to_string(path)
            .with_path_context("read team file", path)?;
        let root = self.import_json(store, &text)?;
        info!("import_file: imported {} members from {}", store.len(), path.display());
        Ok(root)
    }

    /// Load a previously exported team. Unlike [`Self::import_json`], the
    /// empty export `{}` is accepted and yields an empty store.
    pub fn restore_json(
        &self,
        store: &mut HierarchyStore,
        text: &str,
    ) -> ApplicationResult<Option<MemberId>> {
        let is_empty_export = text.split_whitespace().collect::<String>() == "{}";
        if is_empty_export {
            store.set_root(MemberArena::new());
            return Ok(None);
        }
        self.import_json(store, text).map(Some)
    }

    #[instrument(level = "debug", skip(self, store))]
    pub fn restore_file(
        &self,
        store: &mut HierarchyStore,
        path: &Path,
    ) -> ApplicationResult<Option<MemberId>> {
        let text = self
            .fs
            .read_to_string(path)
            .with_path_context("read team file", path)?;
        self.restore_json(store, &text)
    }

    /// Serialise the current team; an empty team exports as `{}`.
    pub fn export_json(&self, store: &HierarchyStore, pretty: bool) -> ApplicationResult<String> {
        let value = match MemberRecord::from_tree(store.tree()) {
            Some(record) => serde_json::to_value(record),
            None => Ok(serde_json::Value::Object(Default::default())),
        }
        .map_err(|e| ApplicationError::OperationFailed {
            context: "serialise team".to_string(),
            source: Box::new(e),
        })?;
        let rendered = if pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        rendered.map_err(|e| ApplicationError::OperationFailed {
            context: "serialise team".to_string(),
            source: Box::new(e),
        })
    }

    #[instrument(level = "debug", skip(self, store))]
    pub fn export_file(
        &self,
        store: &HierarchyStore,
        path: &Path,
        pretty: bool,
    ) -> ApplicationResult<()> {
        let mut json = self.export_json(store, pretty)?;
        json.push('\n');
        self.fs
            .write(path, &json)
            .with_path_context("write team file", path)?;
        debug!("export_file: wrote {} members to {}", store.len(), path.display());
        Ok(())
    }
}

/// Parse the nested record without a nesting limit.
///
/// Exports nest one object and one array per tree level, so deep chains
/// (e.g. after rebalancing by 1) exceed serde_json's default limit of 128.
/// The stack grows on demand instead.
fn parse_record(text: &str) -> ApplicationResult<MemberRecord> {
    let invalid = |e: serde_json::Error| ApplicationError::InvalidJson(e.to_string());
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let record = MemberRecord::deserialize(serde_stacker::Deserializer::new(&mut de))
        .map_err(invalid)?;
    de.end().map_err(invalid)?;
    Ok(record)
}

/// Build a candidate tree from nested records.
///
/// Fields are validated record by record, stopping at the first invalid one.
/// Ids are kept when present so exported teams re-import unchanged.
fn build_tree(record: &MemberRecord) -> ApplicationResult<MemberArena> {
    let mut tree = MemberArena::new();
    let mut ids = HashSet::new();
    let mut stack: Vec<(&MemberRecord, Option<Index>)> = vec![(record, None)];

    while let Some((current, manager)) = stack.pop() {
        let errors = validation::validate_fields(current.name.as_deref(), current.email.as_deref());
        if !errors.is_empty() {
            return Err(ApplicationError::IncorrectStructure(errors));
        }
        let id = match current.id.as_deref() {
            Some(raw) => raw.parse::<MemberId>().map_err(|_| {
                ApplicationError::IncorrectStructure(FieldErrors::single("id", validation::ID_INVALID))
            })?,
            None => MemberId::new(),
        };
        if !ids.insert(id) {
            return Err(ApplicationError::IncorrectStructure(FieldErrors::single(
                "id",
                validation::IDS_DUPLICATED,
            )));
        }

        let name = current.name.as_deref().unwrap_or_default().trim();
        let email = current.email.as_deref().unwrap_or_default().trim();
        let idx = tree.insert(Member::with_id(id, name, email), manager)?;

        // reversed so employees keep their order once popped
        for employee in current.employees.iter().rev() {
            stack.push((employee, Some(idx)));
        }
    }
    Ok(tree)
}
