//! Local, ordered view of the user's images.
//!
//! DESIGN
//! ======
//! Mirrors what the gallery screen keeps between calls: the list in display
//! order. Drag-and-drop swaps two positions and the resulting order is sent
//! to `/images/rearrange` as a whole.

#[cfg(test)]
#[path = "gallery_test.rs"]
mod gallery_test;

use crate::net::types::{EditedImage, Image};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Gallery {
    images: Vec<Image>,
}

impl Gallery {
    #[must_use]
    pub fn new(images: Vec<Image>) -> Self {
        Self { images }
    }

    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    #[must_use]
    pub fn position(&self, image_id: &str) -> Option<usize> {
        self.images.iter().position(|i| i.id == image_id)
    }

    /// Swap the images at `from` and `to`. Returns `false` (and changes
    /// nothing) when the indices are equal or out of range.
    pub fn swap(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.images.len() || to >= self.images.len() {
            return false;
        }
        self.images.swap(from, to);
        true
    }

    /// Image ids in display order.
    #[must_use]
    pub fn order(&self) -> Vec<String> {
        self.images.iter().map(|i| i.id.clone()).collect()
    }

    /// Apply the server's answer to an edit. Returns `false` for unknown ids.
    pub fn apply_edit(&mut self, image_id: &str, edited: &EditedImage) -> bool {
        let Some(image) = self.images.iter_mut().find(|i| i.id == image_id) else {
            return false;
        };
        image.title.clone_from(&edited.title);
        image.path.clone_from(&edited.path);
        true
    }

    pub fn remove(&mut self, image_id: &str) -> Option<Image> {
        let index = self.position(image_id)?;
        Some(self.images.remove(index))
    }
}
