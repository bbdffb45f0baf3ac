/// Events emitted by the workflows while they run.
///
/// A phase groups related work ("Validation", "Analyses", ...). Inside a
/// task, every unit of work is a named step: one staged file during setup,
/// one GROMACS tool during analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    StepStart { name: String },
    /// `ok` is false when the step produced no usable result.
    StepFinish { name: String, ok: bool },
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    pub fn step_start(&self, name: impl Into<String>) {
        self.report(Progress::StepStart { name: name.into() });
    }

    pub fn step_finish(&self, name: impl Into<String>, ok: bool) {
        self.report(Progress::StepFinish {
            name: name.into(),
            ok,
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Reporter that keeps every event for later inspection.
    pub(crate) fn recording_reporter() -> (ProgressReporter<'static>, Arc<Mutex<Vec<Progress>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p| {
            sink.lock().unwrap().push(p);
        }));
        (reporter, seen)
    }

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.step_start("rmsd");
        reporter.step_finish("rmsd", true);
    }

    #[test]
    fn step_helpers_carry_the_step_name() {
        let (reporter, seen) = recording_reporter();

        reporter.report(Progress::PhaseStart { name: "Analyses" });
        reporter.report(Progress::TaskStart { total_steps: 1 });
        reporter.step_start("hbond");
        reporter.step_finish("hbond", false);
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[2..4],
            [
                Progress::StepStart {
                    name: "hbond".into()
                },
                Progress::StepFinish {
                    name: "hbond".into(),
                    ok: false
                },
            ]
        );
        assert_eq!(seen.len(), 6);
    }
}
