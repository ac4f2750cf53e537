//! The insertion-ordered list of registration records.

use std::{
	fmt::{self, Debug, Formatter},
	sync::{Arc, Mutex, PoisonError},
};

use arc_swap::ArcSwap;
use serde_json::Value;
use tracing::debug;

use crate::{
	handler::{MethodHandler, MethodKind},
	middleware::HookFn,
	pattern::{compile, is_under, trim_slashes, CompiledPattern},
	request::Options,
};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

// --------------------------------------------------
// Record

/// Binds a pattern to a method handler, a hook or an options bag.
#[derive(Clone)]
pub(crate) struct Record {
	pub(crate) exact: Arc<CompiledPattern>,
	pub(crate) prefix: Arc<CompiledPattern>,
	pub(crate) kind: RecordKind,
}

#[derive(Clone)]
pub(crate) enum RecordKind {
	/// A method handler. `None` resets the method to "undefined".
	Method(MethodKind, Option<MethodHandler>),
	Hook(HookFn),
	/// Strict options apply to the pattern itself but not to its sub-paths.
	Options { strict: bool, bag: Arc<Options> },
}

impl Record {
	fn new(raw: &str, kind: RecordKind) -> Self {
		Self {
			exact: compile(raw, false),
			prefix: compile(raw, true),
			kind,
		}
	}

	#[inline(always)]
	pub(crate) fn raw(&self) -> &str {
		self.exact.raw()
	}
}

impl Debug for Record {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let kind = match &self.kind {
			RecordKind::Method(method_kind, some_handler) => format!(
				"Method({}, {})",
				method_kind,
				if some_handler.is_some() { "set" } else { "unset" },
			),
			RecordKind::Hook(_) => "Hook".to_owned(),
			RecordKind::Options { strict, bag } => format!("Options(strict: {}, {:?})", strict, bag),
		};

		f.debug_struct("Record")
			.field("pattern", &self.raw())
			.field("kind", &kind)
			.finish()
	}
}

// --------------------------------------------------
// Registry

/// The registration records of a router.
///
/// Readers load a snapshot of the list and never block. Writers are serialized
/// and swap in a modified copy.
pub(crate) struct Registry {
	records: ArcSwap<Vec<Record>>,
	write_lock: Mutex<()>,
}

impl Registry {
	pub(crate) fn new() -> Self {
		Self {
			records: ArcSwap::from_pointee(Vec::new()),
			write_lock: Mutex::new(()),
		}
	}

	/// The current list of records. Later mutations don't affect it.
	#[inline(always)]
	pub(crate) fn snapshot(&self) -> Arc<Vec<Record>> {
		self.records.load_full()
	}

	fn update<F>(&self, mutate: F)
	where
		F: FnOnce(&mut Vec<Record>),
	{
		let _write_guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

		let mut records = Vec::clone(&self.records.load());
		mutate(&mut records);

		self.records.store(Arc::new(records));
	}

	// -------------------------

	/// Sets or unsets the method on the pattern, replacing the record of an
	/// earlier registration for the same pair.
	pub(crate) fn set_method(
		&self,
		raw: &str,
		method_kind: MethodKind,
		some_handler: Option<MethodHandler>,
	) {
		let raw = trim_slashes(raw);

		debug!(
			pattern = raw,
			method = %method_kind,
			is_set = some_handler.is_some(),
			"registering method",
		);

		let record = Record::new(raw, RecordKind::Method(method_kind, some_handler));

		self.update(|records| {
			records.retain(|existing| {
				!(existing.raw() == raw
					&& matches!(existing.kind, RecordKind::Method(kind, _) if kind == method_kind))
			});

			records.push(record);
		});
	}

	pub(crate) fn add_hook(&self, raw: &str, hook: HookFn) {
		let raw = trim_slashes(raw);

		debug!(pattern = raw, "registering hook");

		let record = Record::new(raw, RecordKind::Hook(hook));

		self.update(|records| records.push(record));
	}

	/// Merges the options into the pattern's options record, creating the
	/// record if the pattern has none with the same strictness.
	pub(crate) fn set_options<I>(&self, raw: &str, strict: bool, options: I)
	where
		I: IntoIterator<Item = (String, Value)>,
	{
		let raw = trim_slashes(raw);

		debug!(pattern = raw, strict, "registering options");

		let options = options.into_iter().collect::<Vec<_>>();

		self.update(|records| {
			let some_bag = records.iter_mut().find_map(|record| match &mut record.kind {
				RecordKind::Options {
					strict: existing_strict,
					bag,
				} if *existing_strict == strict && record.exact.raw() == raw => Some(bag),
				_ => None,
			});

			if let Some(bag) = some_bag {
				Arc::make_mut(bag).extend(options);

				return;
			}

			let bag = Arc::new(options.into_iter().collect());
			records.push(Record::new(raw, RecordKind::Options { strict, bag }));
		});
	}

	/// Removes every record of the pattern and of the patterns under it.
	pub(crate) fn remove_prefix(&self, prefix: &str) {
		debug!(pattern = prefix, "removing patterns");

		self.update(|records| records.retain(|record| !is_under(record.raw(), prefix)));
	}
}

impl Debug for Registry {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.snapshot().iter()).finish()
	}
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------
