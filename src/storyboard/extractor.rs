use crate::models::storyboard::{StoryboardBlock, TextNode};
use crate::storyboard::tags::{CLOSE_MARKER, OPEN_MARKER};

/// Slices every `<canvas_page>...</canvas_page>` region out of an ordered
/// node sequence, preserving order and embedded markup (serialized tables
/// included). Marker lines are kept inside the block.
///
/// A second opening marker encountered inside a block is ordinary content; no
/// nesting is supported. An unterminated region at end-of-input is dropped.
pub fn extract_blocks(nodes: &[TextNode]) -> Vec<StoryboardBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut inside = false;

    for node in nodes {
        let text = node.text();
        let lower = text.to_lowercase();

        if !inside {
            if lower.contains(OPEN_MARKER) {
                inside = true;
                current = vec![text.to_string()];
                // Open and close markers can land in the same node.
                if close_follows_open(&lower) {
                    flush(&mut blocks, &mut current);
                    inside = false;
                }
            }
            continue;
        }

        current.push(text.to_string());
        if lower.contains(CLOSE_MARKER) {
            flush(&mut blocks, &mut current);
            inside = false;
        }
    }

    if inside {
        log::warn!(
            "Dropping unterminated <canvas_page> region ({} node(s)) at end of input",
            current.len()
        );
    }

    blocks
}

fn close_follows_open(lower: &str) -> bool {
    match (lower.find(OPEN_MARKER), lower.find(CLOSE_MARKER)) {
        (Some(open), Some(close)) => close > open,
        _ => false,
    }
}

fn flush(blocks: &mut Vec<StoryboardBlock>, current: &mut Vec<String>) {
    blocks.push(StoryboardBlock {
        sequence_index: blocks.len(),
        raw_text: current.join("\n"),
    });
    current.clear();
}
