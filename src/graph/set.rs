use std::collections::HashMap;

use serde::Serialize;

use super::error::GraphError;

/// Something stored in an [`ElementSet`], keyed by its id.
pub trait Element {
	/// Name used in error messages.
	const KIND: &'static str;

	fn id(&self) -> &str;
}

/// Insertion-ordered collection with unique ids. Adding an id twice is an error
/// rather than an overwrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementSet<T> {
	items: Vec<T>,
	index: HashMap<String, usize>,
}

impl<T> Default for ElementSet<T> {
	fn default() -> Self {
		Self {
			items: Vec::new(),
			index: HashMap::new(),
		}
	}
}

impl<T: Element> ElementSet<T> {
	pub fn add(&mut self, item: T) -> Result<(), GraphError> {
		if self.index.contains_key(item.id()) {
			return Err(GraphError::DuplicateId {
				kind: T::KIND,
				id: item.id().to_owned(),
			});
		}
		self.index.insert(item.id().to_owned(), self.items.len());
		self.items.push(item);
		Ok(())
	}

	pub fn get(&self, id: &str) -> Option<&T> {
		self.index.get(id).map(|&i| &self.items[i])
	}

	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}
}

impl<T> ElementSet<T> {
	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.items.iter()
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl<'a, T> IntoIterator for &'a ElementSet<T> {
	type Item = &'a T;
	type IntoIter = std::slice::Iter<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.iter()
	}
}

impl<T: Serialize> Serialize for ElementSet<T> {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.items.serialize(serializer)
	}
}
