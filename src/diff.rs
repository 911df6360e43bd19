use alloc::vec::Vec;

use crate::Splice;

/// Computes the splices that turn `before` into `after`.
///
/// `eq` compares items by identity. `existed_before(item)` reports whether an item of `after`
/// is also present somewhere in `before`; when the two sequences disagree at a position, an
/// `after` item that existed before means the `before` item in the way was deleted, otherwise
/// the `after` item is an insertion.
///
/// The splices are ordered by `start`, never overlap, and address positions in `before`. For
/// mutations without reordering (insertions and deletions only) the script is minimal.
pub fn diff<T: Clone>(
    before: &[T],
    after: &[T],
    mut eq: impl FnMut(&T, &T) -> bool,
    mut existed_before: impl FnMut(&T) -> bool,
) -> Vec<Splice<T>> {
    let mut out: Vec<Splice<T>> = Vec::new();
    let mut b = 0usize;
    let mut a = 0usize;

    loop {
        if b == before.len() {
            push_splice(&mut out, b, 0, &after[a..]);
            break;
        }
        if a == after.len() {
            push_splice(&mut out, b, before.len() - b, &[]);
            break;
        }

        if eq(&before[b], &after[a]) {
            b += 1;
            a += 1;
        } else if existed_before(&after[a]) {
            push_splice(&mut out, b, 1, &[]);
            b += 1;
        } else {
            push_splice(&mut out, b, 0, core::slice::from_ref(&after[a]));
            a += 1;
        }
    }
    out
}

fn push_splice<T: Clone>(out: &mut Vec<Splice<T>>, start: usize, delete_count: usize, inserted: &[T]) {
    if delete_count == 0 && inserted.is_empty() {
        return;
    }
    if let Some(last) = out.last_mut() {
        if last.end() == start {
            last.delete_count += delete_count;
            last.inserted.extend_from_slice(inserted);
            return;
        }
    }
    out.push(Splice {
        start,
        delete_count,
        inserted: inserted.to_vec(),
    });
}

/// Applies `splices` (as produced by [`diff`]) to `items`.
///
/// Splices are applied in strictly decreasing `start` order so that positions recorded for
/// earlier splices stay valid while later ones are applied.
pub fn apply_splices<T: Clone>(items: &mut Vec<T>, splices: &[Splice<T>]) {
    debug_assert!(
        splices.windows(2).all(|w| w[0].end() <= w[1].start),
        "apply_splices: splices must be ordered and non-overlapping"
    );
    for splice in splices.iter().rev() {
        items.splice(splice.start..splice.end(), splice.inserted.iter().cloned());
    }
}
