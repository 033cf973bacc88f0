//! Status combination across several optional steps.

use crate::domain::{Status, StepResult};

/// Reduce optional step results to one status.
///
/// Absent and N-A entries are ignored. Any remaining FAIL wins; otherwise
/// any remaining entry makes the result PASS; with nothing left it is N-A.
pub fn combine_statuses(steps: &[Option<&StepResult>]) -> Status {
    let mut seen = false;
    for step in steps.iter().flatten() {
        match step.status {
            Status::Fail => return Status::Fail,
            Status::Pass => seen = true,
            Status::NotApplicable => {}
        }
    }
    if seen {
        Status::Pass
    } else {
        Status::NotApplicable
    }
}

/// Overall verdict over raw step records.
///
/// FAIL if any step failed; N-A if every step is N-A (or there are none);
/// PASS otherwise.
pub fn overall_status(steps: &[StepResult]) -> Status {
    if steps.iter().any(|s| s.status == Status::Fail) {
        Status::Fail
    } else if steps.iter().all(|s| s.status == Status::NotApplicable) {
        Status::NotApplicable
    } else {
        Status::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(status: Status) -> StepResult {
        let mut s = StepResult::not_executed("step", "note");
        s.status = status;
        s
    }

    #[test]
    fn test_empty_is_na() {
        assert_eq!(combine_statuses(&[]), Status::NotApplicable);
        assert_eq!(combine_statuses(&[None, None]), Status::NotApplicable);
    }

    #[test]
    fn test_na_entries_are_ignored() {
        let na = step(Status::NotApplicable);
        let pass = step(Status::Pass);
        assert_eq!(combine_statuses(&[Some(&na), None]), Status::NotApplicable);
        assert_eq!(combine_statuses(&[Some(&na), Some(&pass)]), Status::Pass);
    }

    #[test]
    fn test_any_fail_wins() {
        let pass = step(Status::Pass);
        let fail = step(Status::Fail);
        let na = step(Status::NotApplicable);
        assert_eq!(
            combine_statuses(&[Some(&pass), Some(&na), Some(&fail)]),
            Status::Fail
        );
        assert_eq!(combine_statuses(&[Some(&fail), None]), Status::Fail);
    }

    #[test]
    fn test_combine_law_exhaustive() {
        let options = [
            None,
            Some(Status::Pass),
            Some(Status::Fail),
            Some(Status::NotApplicable),
        ];
        for a in options {
            for b in options {
                let sa = a.map(step);
                let sb = b.map(step);
                let got = combine_statuses(&[sa.as_ref(), sb.as_ref()]);
                let present: Vec<Status> = [a, b]
                    .into_iter()
                    .flatten()
                    .filter(|s| *s != Status::NotApplicable)
                    .collect();
                let expected = if present.contains(&Status::Fail) {
                    Status::Fail
                } else if present.is_empty() {
                    Status::NotApplicable
                } else {
                    Status::Pass
                };
                assert_eq!(got, expected, "a={a:?} b={b:?}");
            }
        }
    }

    #[test]
    fn test_overall_status() {
        assert_eq!(overall_status(&[]), Status::NotApplicable);
        assert_eq!(
            overall_status(&[step(Status::NotApplicable), step(Status::NotApplicable)]),
            Status::NotApplicable
        );
        assert_eq!(
            overall_status(&[step(Status::NotApplicable), step(Status::Pass)]),
            Status::Pass
        );
        assert_eq!(
            overall_status(&[step(Status::Pass), step(Status::Fail)]),
            Status::Fail
        );
    }
}
