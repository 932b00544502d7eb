/// ProgressReporter port for reporting progress during a replay
///
/// This port abstracts console feedback (e.g., to stderr) so the replay
/// driver can report steps and background drains without knowing how they
/// are rendered.
pub trait ProgressReporter {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports how far through a sequence of steps the run is
    ///
    /// # Arguments
    /// * `current` - Steps finished so far
    /// * `total` - Total number of steps
    /// * `message` - Optional message to include
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Shows an indeterminate spinner until the next report
    fn report_waiting(&self, message: &str);

    /// Reports an error or warning message
    fn report_error(&self, message: &str);

    /// Reports completion of the run
    fn report_completion(&self, message: &str);
}
