use uuid::Uuid;

/// What happened to one due campaign during a dispatch run.
#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CampaignDisposition {
    /// Claimed, delivered, finalized. `sent` recipients succeeded,
    /// `failed` recipients did not; the campaign is `sent` either way.
    Completed { sent: u64, failed: u64 },
    /// A concurrent run claimed this campaign first; nothing was sent.
    AlreadyClaimed,
    /// The run deadline elapsed before this campaign was claimed; it
    /// stays `scheduled` for the next trigger.
    Deferred,
    /// A store error interrupted this campaign; the others still ran.
    Errored { message: String },
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CampaignOutcome {
    pub campaign_id: Uuid,
    #[serde(flatten)]
    pub disposition: CampaignDisposition,
}

/// Returned to the dispatch trigger caller; per-recipient detail is
/// already persisted as campaign send rows and is not repeated here.
#[derive(serde::Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcomes: Vec<CampaignOutcome>,
}

impl DispatchReport {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
