//! Morse binary tree shared by the decoder and the text encoder.
//!
//! A code is a path from the root: a Dit goes to `2i + 1`, a Dah to `2i + 2`.
//! Index 0 is the root and stands for the word space.

use heapless::Vec;

use crate::types::Element;

/// Longest code the tree holds
pub const MAX_DEPTH: usize = 6;

/// Marker for unassigned slots and for codes that run off the table
pub const UNKNOWN: char = '*';

/// Character at the root, emitted for a word boundary
pub const WORD_SPACE: char = ' ';

/// Flat tree, depth first by level. Ends at `..--.-` ('_'), the deepest
/// assigned code this keyer knows.
pub static MORSE_TREE: [char; 77] = [
    // root
    ' ',
    // depth 1
    'E', 'T',
    // depth 2
    'I', 'A', 'N', 'M',
    // depth 3
    'S', 'U', 'R', 'W', 'D', 'K', 'G', 'O',
    // depth 4
    'H', 'V', 'F', '*', 'L', '*', 'P', 'J', 'B', 'X', 'C', 'Y', 'Z', 'Q', '*', '*',
    // depth 5
    '5', '4', '*', '3', '*', '*', '*', '2', '&', '*', '+', '*', '*', '*', '*', '1',
    '6', '=', '/', '*', '*', '*', '(', '*', '7', '*', '*', '*', '8', '*', '9', '0',
    // depth 6, up to '_'
    '*', '*', '*', '*', '*', '*', '*', '*', '*', '*', '*', '*', '?', '_',
];

/// Largest index that can be looked up
pub const MAX_INDEX: usize = MORSE_TREE.len() - 1;

/// Forward transition for one element
pub const fn advance(index: usize, element: Element) -> usize {
    2 * index + element.tree_offset()
}

/// Character stored at `index`; `None` past the end of the table
pub fn char_at(index: usize) -> Option<char> {
    MORSE_TREE.get(index).copied()
}

/// Tree index of `c` after case folding. Unassigned slots are not matched.
pub fn index_of(c: char) -> Option<usize> {
    let c = c.to_ascii_uppercase();
    if c == UNKNOWN {
        return None;
    }
    MORSE_TREE.iter().position(|&entry| entry == c)
}

/// Elements leading from the root to `index`, in sending order.
///
/// Walks upward: an odd index was reached by a Dit, an even one by a Dah.
pub fn path_to(index: usize) -> Vec<Element, MAX_DEPTH> {
    let mut path = Vec::new();
    let mut i = index;
    while i > 0 && !path.is_full() {
        let element = if i % 2 == 1 { Element::Dit } else { Element::Dah };
        path.push(element).ok();
        i = (i - element.tree_offset()) / 2;
    }
    path.reverse();
    path
}

/// Elements for `c`, or `None` when it has no code in the tree.
/// The word space yields an empty sequence.
pub fn encode_char(c: char) -> Option<Vec<Element, MAX_DEPTH>> {
    index_of(c).map(path_to)
}
