// src/crawl/frontier.rs
// =============================================================================
// The frontier decides what gets crawled next.
//
// How it works:
// 1. Discovered links are offered with their depth
// 2. Links deeper than max_depth, or already visited, are never queued
// 3. next_dispatch() pops the most recently queued task (LIFO), skips it if
//    it was visited meanwhile, and otherwise marks it visited and returns it
// 4. The crawl is over when nothing is left to pop
//
// A URL is marked visited when it is dispatched, not when its fetch finishes.
// Marking happens in the same call that pops the task, so no URL can be
// handed out twice.
// =============================================================================

use std::collections::HashSet;
use url::Url;

// A page waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: usize, // Link hops from the base URL (the base itself is 0)
}

// What happened to a URL offered to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    AlreadyVisited,
    TooDeep,
}

#[derive(Debug)]
pub struct Frontier {
    max_depth: usize,
    visited: HashSet<String>,
    stack: Vec<CrawlTask>,
}

impl Frontier {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            visited: HashSet::new(),
            stack: Vec::new(),
        }
    }

    // Offers one URL at the given depth
    pub fn offer(&mut self, url: Url, depth: usize) -> Admission {
        if depth > self.max_depth {
            return Admission::TooDeep;
        }
        if self.is_visited(&url) {
            return Admission::AlreadyVisited;
        }

        self.stack.push(CrawlTask { url, depth });
        Admission::Queued
    }

    // Offers all links found on one page, returning how many were queued.
    //
    // Links are pushed in reverse so the first link on the page is popped
    // first, giving the same order as visiting each link recursively.
    pub fn offer_links(&mut self, links: Vec<Url>, depth: usize) -> usize {
        let mut queued = 0;
        for link in links.into_iter().rev() {
            if self.offer(link, depth) == Admission::Queued {
                queued += 1;
            }
        }
        queued
    }

    // Pops the next task to fetch and marks its URL visited.
    //
    // Returns None once the stack holds no unvisited URL.
    pub fn next_dispatch(&mut self) -> Option<CrawlTask> {
        while let Some(task) = self.stack.pop() {
            if self.visited.insert(task.url.as_str().to_string()) {
                return Some(task);
            }
        }
        None
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    // Tasks waiting on the stack (may include URLs visited since they were queued)
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a stack and not recursion?
//    - Visiting a page and then recursing into each of its links gives a
//      depth-first crawl, but a deep site would grow the call stack
//    - Pushing the links (in reverse) onto a Vec and popping from the end
//      visits pages in exactly the same order with no recursion at all
//
// 2. Why can a URL sit on the stack twice?
//    - Two pages can link to the same URL before either copy is popped
//    - We only check the visited set at pop time, so the second copy is
//      skipped there; the fetch still happens once
//
// 3. Why is the depth check done in offer()?
//    - So a task deeper than max_depth is never created in the first place
// -----------------------------------------------------------------------------
