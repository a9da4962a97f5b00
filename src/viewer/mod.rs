// debook-core - DRM e-book container unpacking and viewing
// Copyright (C) 2025 debook contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Viewer state and pagination
//!
//! A [`Viewer`] owns everything that survives across user interactions:
//! the current page list, the cursor into it, the account id, and the
//! render callback. One viewer instance per open book; instances share
//! nothing, so several can coexist in one process.
//!
//! Navigation never fails. Out-of-range input is corrected, not
//! rejected: boundary moves are no-ops and invalid jumps leave the
//! cursor where it was. Every call returns the 1-based display index so
//! a caller can re-sync its page-number input after a rejected jump.

use crate::api::KeyExchange;
use crate::book::{BookUnpacker, Page};
use crate::error::{DebookError, Result};
use std::sync::Arc;
use tracing::debug;

/// Position passed to the render callback: 1-based current page and total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePosition {
    pub current: usize,
    pub total: usize,
}

/// Callback fired once per state change (page turn or successful load)
///
/// Uses Arc instead of Box to enable Clone trait
pub type RenderCallback = Arc<dyn Fn(&Page, PagePosition) + Send + Sync>;

/// Ordered page list plus a bounds-checked cursor
///
/// Invariant: `current < pages.len()` whenever the list is non-empty;
/// with an empty list there is no current page and every navigation is a
/// no-op. Mutators report whether the cursor actually moved.
#[derive(Default)]
pub struct PaginationState {
    pages: Vec<Page>,
    current: usize,
}

impl PaginationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the page list, resetting the cursor to the first page
    pub fn reset(&mut self, pages: Vec<Page>) {
        self.pages = pages;
        self.current = 0;
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// 0-based cursor; meaningless while the list is empty
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pages.get(self.current)
    }

    /// Advance one page; no-op at the last page
    pub fn go_next(&mut self) -> bool {
        if self.current + 1 < self.pages.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page; no-op at the first page
    pub fn go_previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a 0-based index; out-of-range input leaves the cursor
    /// unchanged
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.pages.len() && index != self.current {
            self.current = index;
            true
        } else {
            false
        }
    }
}

/// One open book: unpacker, pagination state, account, render callback
pub struct Viewer<K: KeyExchange> {
    unpacker: BookUnpacker<K>,
    state: PaginationState,
    account_id: Option<String>,
    on_render: Option<RenderCallback>,
    /// Bumped per load; a completed unpack whose generation is no longer
    /// current publishes nothing (stale in-flight result).
    generation: u64,
}

impl<K: KeyExchange> Viewer<K> {
    pub fn new(key_exchange: K) -> Self {
        Self {
            unpacker: BookUnpacker::new(key_exchange),
            state: PaginationState::new(),
            account_id: None,
            on_render: None,
            generation: 0,
        }
    }

    /// Set the account/wallet identifier used for key requests
    pub fn set_account_id(&mut self, id: impl Into<String>) {
        self.account_id = Some(id.into());
    }

    /// Register the render callback fired on every state change
    pub fn set_render_callback(&mut self, callback: RenderCallback) {
        self.on_render = Some(callback);
    }

    /// Unpack a container file and publish its pages
    ///
    /// On success the previous page list is replaced, the cursor moves to
    /// the first page, and the callback fires once (non-empty list only).
    /// On failure the previous state is left untouched, so the viewer
    /// stays usable with whatever was loaded before.
    ///
    /// # Returns
    /// The number of pages in the new list.
    pub async fn load_file(&mut self, file_bytes: &[u8]) -> Result<usize> {
        let account_id = self
            .account_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or(DebookError::AccountNotSet)?;

        self.generation += 1;
        let generation = self.generation;

        let pages = self.unpacker.unpack(file_bytes, &account_id).await?;

        if generation != self.generation {
            debug!(generation, "discarding stale unpack result");
            return Ok(self.state.len());
        }

        self.state.reset(pages);
        self.notify();
        Ok(self.state.len())
    }

    /// Turn to the next page; no-op (and no callback) at the last page
    pub fn next_page(&mut self) -> usize {
        if self.state.go_next() {
            self.notify();
        }
        self.display_index()
    }

    /// Turn to the previous page; no-op (and no callback) at the first page
    pub fn previous_page(&mut self) -> usize {
        if self.state.go_previous() {
            self.notify();
        }
        self.display_index()
    }

    /// Jump to a 1-based page number
    ///
    /// Out-of-range input (including 0) leaves the current page
    /// unchanged; the returned display index is what the caller's page
    /// input should be reset to.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        if page >= 1 && self.state.go_to(page - 1) {
            self.notify();
        }
        self.display_index()
    }

    /// 1-based index for display, 0 when no book is loaded
    pub fn display_index(&self) -> usize {
        if self.state.is_empty() {
            0
        } else {
            self.state.current_index() + 1
        }
    }

    pub fn page_count(&self) -> usize {
        self.state.len()
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.state.current_page()
    }

    fn notify(&self) {
        if let (Some(callback), Some(page)) = (&self.on_render, self.state.current_page()) {
            callback(
                page,
                PagePosition {
                    current: self.state.current_index() + 1,
                    total: self.state.len(),
                },
            );
        }
    }
}
