use chrono::{Datelike, NaiveDate};

/// Rotation gauche indexée sur le jour de l'année (`ordinal mod n`) : la
/// priorité d'affectation glisse sur l'effectif au fil de la période au lieu
/// de toujours favoriser la tête de liste.
pub fn rotate_staff_for_fair_distribution<T: Clone>(list: &[T], date: NaiveDate) -> Vec<T> {
    if list.len() < 2 {
        return list.to_vec();
    }
    let start = date.ordinal() as usize % list.len();
    let mut rotated = Vec::with_capacity(list.len());
    rotated.extend_from_slice(&list[start..]);
    rotated.extend_from_slice(&list[..start]);
    rotated
}

/// Dates de la période, bornes incluses ; vide si `end < start`.
pub(super) fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut current = start;
    while current <= end {
        out.push(current);
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    out
}
