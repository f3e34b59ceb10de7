/// Perform a min k-selection (e.g. select the 10 smallest items) on an
/// array, in place. This algorithm works by building a bounded max heap
/// in the array. The `k` lowest elements in the slice will be stored in
/// first `k` elements in the slice, but they will be stored in max-heap order,
/// not in sorted order. Otherwise, this is equivalent to performing a partial
/// sort
pub fn bounded_max_heapify<T: Ord>(slice: &mut [T], k: usize) {
    if k == 0 || slice.len() <= k {
        return;
    }

    for i in (0..k / 2).rev() {
        sift_down(&mut slice[..k], i);
    }

    debug_assert!(check_heap(&slice[..k]));

    // Anything smaller than the current heap maximum displaces it
    for i in k..slice.len() {
        if slice[i] < slice[0] {
            slice.swap(i, 0);
            sift_down(&mut slice[..k], 0);
            debug_assert!(check_heap(&slice[..k]));
        }
    }
}

/// Keep only the `k` smallest items of `items`, sorted ascending
pub fn smallest_k<T: Ord>(items: &mut Vec<T>, k: usize) {
    bounded_max_heapify(items, k);
    items.truncate(k);
    items.sort_unstable();
}

fn check_heap<T: Ord>(slice: &[T]) -> bool {
    for i in 1..slice.len() {
        let parent = (i - 1) / 2;
        if slice[parent] < slice[i] {
            return false;
        }
    }
    true
}

fn sift_down<T: Ord>(slice: &mut [T], mut index: usize) {
    while let Some(left) = slice.get(index * 2 + 1) {
        let mut largest = index;
        if left > &slice[largest] {
            largest = index * 2 + 1;
        }

        if let Some(right) = slice.get(index * 2 + 2) {
            if right > &slice[largest] {
                largest = index * 2 + 2;
            }
        }

        if largest != index {
            slice.swap(largest, index);
            index = largest;
        } else {
            break;
        }
    }
}
