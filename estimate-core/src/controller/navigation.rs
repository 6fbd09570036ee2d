//! Progress indicator and previous/next/submit affordances derived from
//! the step position.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMarker {
    Completed,
    Active,
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percent: f64,
    pub markers: Vec<StepMarker>,
}

impl Progress {
    pub fn at(
        current: usize,
        total: usize,
    ) -> Self {
        let markers = (1..=total)
            .map(|step| match step.cmp(&current) {
                std::cmp::Ordering::Less => StepMarker::Completed,
                std::cmp::Ordering::Equal => StepMarker::Active,
                std::cmp::Ordering::Greater => StepMarker::Pending,
            })
            .collect();

        Self {
            current,
            total,
            percent: current as f64 / total.max(1) as f64 * 100.0,
            markers,
        }
    }
}

/// Which navigation controls are available on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub previous_enabled: bool,
    pub next_visible: bool,
    pub submit_visible: bool,
}

impl NavigationState {
    pub fn at(
        current: usize,
        total: usize,
    ) -> Self {
        let is_final = current >= total;
        Self {
            previous_enabled: current > 1,
            next_visible: !is_final,
            submit_visible: is_final,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn markers_split_around_current_step() {
        let progress = Progress::at(2, 4);

        assert_eq!(
            progress.markers,
            vec![
                StepMarker::Completed,
                StepMarker::Active,
                StepMarker::Pending,
                StepMarker::Pending,
            ]
        );
        assert_eq!(progress.percent, 50.0);
    }

    #[test]
    fn final_step_swaps_next_for_submit() {
        assert_eq!(
            NavigationState::at(3, 3),
            NavigationState {
                previous_enabled: true,
                next_visible: false,
                submit_visible: true,
            }
        );
        assert_eq!(
            NavigationState::at(1, 3),
            NavigationState {
                previous_enabled: false,
                next_visible: true,
                submit_visible: false,
            }
        );
    }

    #[test]
    fn single_step_form_starts_on_submit() {
        let nav = NavigationState::at(1, 1);

        assert!(nav.submit_visible);
        assert!(!nav.previous_enabled);
        assert_eq!(Progress::at(1, 1).percent, 100.0);
    }
}
