/// Sequential phases of one mirror run.
///
/// Scans and downloads are separated by a full barrier: every scan has
/// finished before `DispatchDownloads` is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    ComputeCutoff,
    ListRoot,
    DispatchScans,
    CollectScanResults,
    DispatchDownloads,
    AwaitDownloads,
    PersistRunState,
    Done,
}

impl RunPhase {
    pub fn next(self) -> Option<RunPhase> {
        match self {
            RunPhase::ComputeCutoff => Some(RunPhase::ListRoot),
            RunPhase::ListRoot => Some(RunPhase::DispatchScans),
            RunPhase::DispatchScans => Some(RunPhase::CollectScanResults),
            RunPhase::CollectScanResults => Some(RunPhase::DispatchDownloads),
            RunPhase::DispatchDownloads => Some(RunPhase::AwaitDownloads),
            RunPhase::AwaitDownloads => Some(RunPhase::PersistRunState),
            RunPhase::PersistRunState => Some(RunPhase::Done),
            RunPhase::Done => None,
        }
    }

    /// Whether `self -> to` is the single legal step forward.
    pub fn can_advance_to(self, to: RunPhase) -> bool {
        self.next() == Some(to)
    }
}
