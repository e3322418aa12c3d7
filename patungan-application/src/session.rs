use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use patungan_domain::{
    AllocationContext, Assignment, Bill, BillAdjustments, DeletedItem, IdlePeople, Item,
    ItemIndex, ItemPatch, ItemUpdate, PersonSplit, Quantity, Reconciliation,
    ReconciliationMismatch, services::verify,
};

use crate::{
    error::{ParseFailure, SessionError},
    ports::{ReceiptParser, RenderRequest, SummaryRenderer},
    receipt::{ParsedData, ReceiptDocument},
};

static LAST_MINTED: AtomicU64 = AtomicU64::new(0);

/// Label of one wizard run. Wall-clock milliseconds, bumped so ids never repeat in-process.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn mint() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        let previous = LAST_MINTED
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        Self(now.max(previous.saturating_add(1)).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Upload = 1,
    EditItems = 2,
    Assign = 3,
    Results = 4,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn previous(self) -> Self {
        match self {
            WizardStep::Upload | WizardStep::EditItems => WizardStep::Upload,
            WizardStep::Assign => WizardStep::EditItems,
            WizardStep::Results => WizardStep::Assign,
        }
    }
}

#[derive(Debug)]
pub struct SplitOutcome {
    pub splits: Vec<PersonSplit>,
    pub reconciliation: Reconciliation,
}

impl SplitOutcome {
    pub fn warning(&self) -> Option<ReconciliationMismatch> {
        self.reconciliation.mismatch()
    }
}

/// One run of the split wizard. Owns the bill and everything derived from it.
pub struct SplitSession {
    id: SessionId,
    step: WizardStep,
    parsed: Option<ParsedData>,
    bill: Bill,
    context: AllocationContext,
}

impl SplitSession {
    pub fn new(context: AllocationContext) -> Self {
        Self {
            id: SessionId::mint(),
            step: WizardStep::Upload,
            parsed: None,
            bill: Bill::default(),
            context,
        }
    }

    /// Picks up a bill that was assembled elsewhere, e.g. from a split request.
    pub fn resume(id: SessionId, bill: Bill, context: AllocationContext) -> Self {
        Self {
            id,
            step: WizardStep::Assign,
            parsed: None,
            bill,
            context,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn parsed(&self) -> Option<&ParsedData> {
        self.parsed.as_ref()
    }

    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    pub fn context(&self) -> AllocationContext {
        self.context
    }

    /// Runs the parser on an uploaded receipt. On failure the wizard stays on the upload step.
    pub fn load_receipt(
        &mut self,
        parser: &dyn ReceiptParser,
        document: &ReceiptDocument<'_>,
    ) -> Result<&ParsedData, SessionError> {
        if !document.is_pdf() {
            tracing::debug!(
                filename = ?document.filename,
                content_type = ?document.content_type,
                "Rejected non-PDF receipt"
            );
            return Err(ParseFailure::UnsupportedDocument {
                filename: document.filename.map(str::to_owned),
                content_type: document.content_type.map(str::to_owned),
            }
            .into());
        }

        let parsed = parser.parse(document).inspect_err(|err| {
            tracing::warn!(error = %err, filename = ?document.filename, "Receipt parsing failed");
        })?;
        self.load_parsed(parsed)
    }

    pub fn load_parsed(&mut self, parsed: ParsedData) -> Result<&ParsedData, SessionError> {
        let bill = parsed
            .to_bill()
            .map_err(|source| ParseFailure::InvalidReceipt { source })?;

        if !parsed.subtotal_matches_items() {
            tracing::warn!(
                printed_subtotal = %parsed.total_price,
                items_subtotal = %parsed.items_subtotal(),
                "Receipt subtotal does not match its items"
            );
        }

        self.id = SessionId::mint();
        self.bill = bill;
        self.step = WizardStep::EditItems;
        tracing::info!(
            session_id = %self.id,
            item_count = parsed.items.len(),
            total_payment = %parsed.total_payment,
            "Receipt loaded"
        );
        Ok(self.parsed.insert(parsed))
    }

    pub fn add_item(&mut self, item: Item) -> Result<ItemIndex, SessionError> {
        Ok(self.bill.add_item(item)?)
    }

    pub fn update_item(
        &mut self,
        index: ItemIndex,
        patch: &ItemPatch,
    ) -> Result<ItemUpdate, SessionError> {
        Ok(self.bill.update_item(index, patch)?)
    }

    pub fn delete_item(&mut self, index: ItemIndex) -> Result<DeletedItem, SessionError> {
        Ok(self.bill.delete_item(index)?)
    }

    pub fn set_adjustments(&mut self, adjustments: BillAdjustments) -> Result<(), SessionError> {
        Ok(self.bill.set_adjustments(adjustments)?)
    }

    pub fn add_person(&mut self, name: &str) -> Result<bool, SessionError> {
        Ok(self.bill.add_person(name)?)
    }

    pub fn remove_person(&mut self, name: &str) -> Vec<Assignment> {
        self.bill.remove_person(name)
    }

    pub fn assign(
        &mut self,
        person: &str,
        index: ItemIndex,
        quantity: Quantity,
    ) -> Result<Quantity, SessionError> {
        Ok(self.bill.assign(person, index, quantity)?)
    }

    pub fn set_quantity(
        &mut self,
        person: &str,
        index: ItemIndex,
        quantity: Quantity,
    ) -> Result<Quantity, SessionError> {
        Ok(self.bill.set_quantity(person, index, quantity)?)
    }

    pub fn unassign(&mut self, person: &str, index: ItemIndex) -> Option<Assignment> {
        self.bill.unassign(person, index)
    }

    pub fn increment(&mut self, person: &str, index: ItemIndex) -> Result<Quantity, SessionError> {
        Ok(self.bill.increment(person, index)?)
    }

    pub fn decrement(&mut self, person: &str, index: ItemIndex) -> Result<Quantity, SessionError> {
        Ok(self.bill.decrement(person, index)?)
    }

    pub fn proceed_to_assign(&mut self) -> Result<(), SessionError> {
        if self.bill.list_items().is_empty() {
            return Err(SessionError::NoItems);
        }
        self.step = WizardStep::Assign;
        Ok(())
    }

    pub fn go_back(&mut self) {
        self.step = self.step.previous();
    }

    /// Provisional split over whatever has been claimed so far.
    pub fn preview(&self) -> SplitOutcome {
        let splits = self.bill.preview_split(self.context);
        let reconciliation = verify(&splits, self.bill.adjustments(), self.context);
        SplitOutcome {
            splits,
            reconciliation,
        }
    }

    /// Final split. Moves the wizard to the results step.
    pub fn calculate(&mut self) -> Result<SplitOutcome, SessionError> {
        let outcome = self.finalized()?;
        self.step = WizardStep::Results;
        tracing::info!(
            session_id = %self.id,
            person_count = outcome.splits.len(),
            reconciled = outcome.reconciliation.ok,
            discrepancy = %outcome.reconciliation.discrepancy,
            "Split calculated"
        );
        Ok(outcome)
    }

    pub fn render_summary(&self, renderer: &dyn SummaryRenderer) -> Result<Vec<u8>, SessionError> {
        let outcome = self.finalized()?;
        let request = RenderRequest {
            session_id: &self.id,
            items: self.bill.list_items(),
            assignments: self.bill.assignments().records(),
            adjustments: self.bill.adjustments(),
            splits: &outcome.splits,
        };
        renderer.render(&request).map_err(|err| {
            tracing::warn!(error = %err, session_id = %self.id, "Summary rendering failed");
            err.into()
        })
    }

    /// Suggested file name of a rendered summary.
    pub fn summary_file_name(&self, renderer: &dyn SummaryRenderer) -> String {
        format!("split_summary_{}.{}", self.id, renderer.extension())
    }

    /// Starts over with a fresh id. The allocation context is kept.
    pub fn reset(&mut self) {
        *self = Self::new(self.context);
        tracing::debug!(session_id = %self.id, "Session reset");
    }

    fn finalized(&self) -> Result<SplitOutcome, SessionError> {
        if self.bill.people().next().is_none() {
            return Err(SessionError::NoPeople);
        }
        let splits = self.bill.finalize_split(self.context, IdlePeople::Exclude)?;
        let reconciliation = verify(&splits, self.bill.adjustments(), self.context);
        Ok(SplitOutcome {
            splits,
            reconciliation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderFailure;
    use patungan_domain::{LedgerError, Money};
    use rstest::{fixture, rstest};
    use std::sync::Mutex;

    struct FixedParser(Result<ParsedData, &'static str>);

    impl ReceiptParser for FixedParser {
        fn parse(&self, _document: &ReceiptDocument<'_>) -> Result<ParsedData, ParseFailure> {
            self.0.clone().map_err(|detail| ParseFailure::Malformed {
                detail: detail.to_owned(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        seen: Mutex<Vec<(String, usize)>>,
        fail: bool,
    }

    impl SummaryRenderer for RecordingRenderer {
        fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<u8>, RenderFailure> {
            if self.fail {
                return Err(RenderFailure::Rasterise);
            }
            self.seen
                .lock()
                .expect("lock poisoned")
                .push((request.session_id.to_string(), request.splits.len()));
            Ok(b"summary".to_vec())
        }

        fn extension(&self) -> &'static str {
            "png"
        }
    }

    fn receipt() -> ParsedData {
        ParsedData {
            items: vec![
                Item::new("Rice", 2, Money::from_i64(10_000)),
                Item::new("Tea", 1, Money::from_i64(5_000)),
            ],
            total_price: Money::from_i64(25_000),
            handling_fee: Money::from_i64(1_000),
            discount: Money::from_i64(500),
            total_payment: Money::from_i64(25_500),
            ..ParsedData::default()
        }
    }

    const PDF: ReceiptDocument<'static> = ReceiptDocument {
        bytes: b"%PDF-1.4",
        filename: Some("receipt.pdf"),
        content_type: Some("application/pdf"),
    };

    #[fixture]
    fn loaded() -> SplitSession {
        let mut session = SplitSession::new(AllocationContext::default());
        session
            .load_receipt(&FixedParser(Ok(receipt())), &PDF)
            .expect("receipt loads");
        session
    }

    #[test]
    fn minted_ids_are_unique() {
        let ids: Vec<SessionId> = (0..64).map(|_| SessionId::mint()).collect();
        for (idx, id) in ids.iter().enumerate() {
            assert!(!ids[idx + 1..].contains(id), "duplicate id {id}");
        }
    }

    #[rstest]
    fn loading_a_receipt_moves_to_item_editing(loaded: SplitSession) {
        assert_eq!(loaded.step(), WizardStep::EditItems);
        assert_eq!(loaded.bill().list_items().len(), 2);
        assert_eq!(loaded.parsed().map(|parsed| parsed.total_payment), Some(Money::from_i64(25_500)));
    }

    #[test]
    fn non_pdf_upload_is_rejected_before_parsing() {
        let mut session = SplitSession::new(AllocationContext::default());
        let document = ReceiptDocument::new(b"\x89PNG")
            .with_filename("receipt.png")
            .with_content_type("image/png");

        let err = session
            .load_receipt(&FixedParser(Ok(receipt())), &document)
            .expect_err("png is not a receipt");

        assert!(matches!(
            err,
            SessionError::Parse(ParseFailure::UnsupportedDocument { .. })
        ));
        assert_eq!(session.step(), WizardStep::Upload);
    }

    #[test]
    fn parser_failure_keeps_upload_step() {
        let mut session = SplitSession::new(AllocationContext::default());
        let err = session
            .load_receipt(&FixedParser(Err("no items found")), &PDF)
            .expect_err("parser fails");

        assert_eq!(err.to_string(), "receipt data is malformed: no items found");
        assert_eq!(session.step(), WizardStep::Upload);
        assert!(session.parsed().is_none());
    }

    #[test]
    fn invalid_parsed_items_are_reported() {
        let mut session = SplitSession::new(AllocationContext::default());
        let mut parsed = receipt();
        parsed.items.push(Item::new("Ghost", 0, Money::from_i64(1)));

        let err = session.load_parsed(parsed).expect_err("zero quantity");

        assert!(matches!(
            err,
            SessionError::Parse(ParseFailure::InvalidReceipt {
                source: LedgerError::ZeroQuantity
            })
        ));
    }

    #[rstest]
    fn cannot_assign_without_items() {
        let mut session = SplitSession::new(AllocationContext::default());
        assert!(matches!(
            session.proceed_to_assign(),
            Err(SessionError::NoItems)
        ));
    }

    #[rstest]
    fn calculate_requires_people(mut loaded: SplitSession) {
        loaded.proceed_to_assign().expect("items present");
        assert!(matches!(loaded.calculate(), Err(SessionError::NoPeople)));
        assert_eq!(loaded.step(), WizardStep::Assign);
    }

    #[rstest]
    fn calculate_blocks_on_unassigned_units(mut loaded: SplitSession) {
        loaded.proceed_to_assign().expect("items present");
        loaded.assign("Alice", ItemIndex(0), 1).expect("within capacity");

        let err = loaded.calculate().expect_err("units remain");

        let SessionError::Incomplete(incomplete) = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(incomplete.items.len(), 2);
        assert_eq!(loaded.step(), WizardStep::Assign);
    }

    #[rstest]
    fn full_wizard_run(mut loaded: SplitSession) {
        loaded.proceed_to_assign().expect("items present");
        loaded.assign("Alice", ItemIndex(0), 1).expect("within capacity");
        loaded.assign("Bob", ItemIndex(0), 1).expect("within capacity");
        loaded.increment("Bob", ItemIndex(1)).expect("within capacity");

        let preview = loaded.preview();
        assert_eq!(preview.splits.len(), 2);

        let outcome = loaded.calculate().expect("fully assigned");
        assert_eq!(loaded.step(), WizardStep::Results);
        assert!(outcome.warning().is_none());
        // Alice 10000 + 500 × 10/25, Bob 15000 + 500 × 15/25.
        assert_eq!(outcome.splits[0].total, Money::from_i64(10_200));
        assert_eq!(outcome.splits[1].total, Money::from_i64(15_300));

        let renderer = RecordingRenderer::default();
        let bytes = loaded.render_summary(&renderer).expect("rendered");
        assert_eq!(bytes, b"summary");
        let seen = renderer.seen.lock().expect("lock poisoned");
        assert_eq!(seen.as_slice(), &[(loaded.id().to_string(), 2)]);
        assert_eq!(
            loaded.summary_file_name(&renderer),
            format!("split_summary_{}.png", loaded.id())
        );
    }

    #[rstest]
    fn render_failure_leaves_results_intact(mut loaded: SplitSession) {
        loaded.assign("Alice", ItemIndex(0), 2).expect("within capacity");
        loaded.assign("Alice", ItemIndex(1), 1).expect("within capacity");
        loaded.calculate().expect("fully assigned");

        let renderer = RecordingRenderer {
            fail: true,
            ..RecordingRenderer::default()
        };
        let err = loaded.render_summary(&renderer).expect_err("renderer fails");

        assert!(matches!(err, SessionError::Render(RenderFailure::Rasterise)));
        assert_eq!(loaded.step(), WizardStep::Results);
    }

    #[rstest]
    fn going_back_and_reset(mut loaded: SplitSession) {
        let first_id = loaded.id().clone();
        loaded.proceed_to_assign().expect("items present");
        loaded.go_back();
        assert_eq!(loaded.step(), WizardStep::EditItems);
        loaded.go_back();
        loaded.go_back();
        assert_eq!(loaded.step(), WizardStep::Upload);

        loaded.reset();
        assert_ne!(loaded.id(), &first_id);
        assert!(loaded.bill().list_items().is_empty());
        assert!(loaded.parsed().is_none());
    }
}
