// WHY: Translates working-text byte offsets back to the immutable original text
// Stored as ordered segments so splices cost O(segments) instead of O(text length)

/// How the bytes of one segment map to the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    /// Unedited text: offset `k` into the segment maps to `original_start + k`
    Identity,
    /// Text produced by a replacement: every offset maps to `original_start`
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    working_start: usize,
    original_start: usize,
    kind: SegmentKind,
}

impl Segment {
    fn translate(&self, position: usize) -> usize {
        match self.kind {
            SegmentKind::Identity => self.original_start + (position - self.working_start),
            SegmentKind::Collapsed => self.original_start,
        }
    }
}

/// Piecewise map from working-text positions to original-text positions
///
/// Segments are sorted by `working_start`, the first one starts at 0 and each
/// one extends to the start of the next (the last one to the working length).
///
/// Boundary policy for replaced text: every byte produced by a replacement maps
/// to the original position where the replaced span started, and the first
/// byte after the replacement maps to the original position where the replaced
/// span ended. Lookups are therefore monotonic, and a working span that exactly
/// covers a replacement translates to the full original span it replaced. A
/// position sitting on a deletion resolves to the first original byte after
/// the deleted run.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
    segments: Vec<Segment>,
    working_len: usize,
    original_len: usize,
}

impl IndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the identity mapping over `[0, length)`
    pub fn initialize(&mut self, length: usize) {
        self.segments.clear();
        if length > 0 {
            self.segments.push(Segment {
                working_start: 0,
                original_start: 0,
                kind: SegmentKind::Identity,
            });
        }
        self.working_len = length;
        self.original_len = length;
    }

    /// Current length of the working text this map describes
    pub fn working_len(&self) -> usize {
        self.working_len
    }

    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Original position for a working position; one-past-end maps to the original length
    pub fn translate(&self, position: usize) -> usize {
        if position >= self.working_len {
            return self.original_len;
        }
        let index = self.segment_index(position);
        self.segments[index].translate(position)
    }

    /// Record that working `[start, end)` was replaced by `new_length` bytes
    ///
    /// Must be called once per splice, before any later position is translated.
    pub fn apply_edit(&mut self, start: usize, end: usize, new_length: usize) {
        debug_assert!(start <= end && end <= self.working_len);

        let anchor = self.translate(start);
        self.split_at(start);
        self.split_at(end);

        let first = self.segments.partition_point(|s| s.working_start < start);
        let last = self.segments.partition_point(|s| s.working_start < end);
        let removed = end - start;

        for segment in &mut self.segments[last..] {
            segment.working_start = segment.working_start + new_length - removed;
        }

        let inserted = (new_length > 0).then_some(Segment {
            working_start: start,
            original_start: anchor,
            kind: SegmentKind::Collapsed,
        });
        self.segments.splice(first..last, inserted);

        self.working_len = self.working_len + new_length - removed;
    }

    /// Number of segments; exposed for diagnostics
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn segment_index(&self, position: usize) -> usize {
        // Segments are non-empty whenever position < working_len, and the first starts at 0
        self.segments.partition_point(|s| s.working_start <= position) - 1
    }

    /// Ensure a segment starts exactly at `position`
    fn split_at(&mut self, position: usize) {
        if position == 0 || position >= self.working_len {
            return;
        }
        let index = self.segment_index(position);
        let segment = self.segments[index];
        if segment.working_start == position {
            return;
        }
        self.segments.insert(
            index + 1,
            Segment {
                working_start: position,
                original_start: segment.translate(position),
                kind: segment.kind,
            },
        );
    }
}
