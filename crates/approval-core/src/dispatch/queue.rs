//! Per-approver work queues
//!
//! A disposable cache rebuilt purely from coordinator submissions. Mutations
//! lock one approver's shard only; reads return a snapshot.

use crate::error::{ApprovalError, Result};
use crate::workflow::DispatchSink;
use approval_types::{ApprovalRequest, EmployeeId, RequestId, WorkItem};
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct DispatchQueue {
    queues: DashMap<EmployeeId, Vec<WorkItem>>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append in arrival order. Duplicate submissions queue twice.
    pub fn submit(&self, item: WorkItem) {
        log::info!(
            "Queued step {} of request {} for approver {}",
            item.step_number,
            item.request_id,
            item.approver_id
        );
        self.queues.entry(item.approver_id).or_default().push(item);
    }

    /// Snapshot of one approver's queue; empty when nothing was ever submitted
    pub fn get(&self, approver_id: EmployeeId) -> Vec<WorkItem> {
        self.queues
            .get(&approver_id)
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    /// Remove and return the first work item for `request_id`
    ///
    /// An approver whose queue empties is dropped from the map.
    pub fn take(&self, approver_id: EmployeeId, request_id: RequestId) -> Option<WorkItem> {
        let taken = {
            let mut items = self.queues.get_mut(&approver_id)?;
            let position = items.iter().position(|item| item.request_id == request_id)?;
            items.remove(position)
        };
        self.queues.remove_if(&approver_id, |_, items| items.is_empty());
        Some(taken)
    }

    /// Number of approvers with a non-empty queue
    pub fn approver_count(&self) -> usize {
        self.queues.len()
    }

    /// Approvers currently holding at least one work item for `request_id`
    pub fn holders_of(&self, request_id: RequestId) -> Vec<EmployeeId> {
        self.queues
            .iter()
            .filter(|entry| entry.value().iter().any(|item| item.request_id == request_id))
            .map(|entry| *entry.key())
            .collect()
    }
}

/// In-process dispatch: the coordinator and the queue share one process
#[async_trait]
impl DispatchSink for DispatchQueue {
    async fn submit(&self, request: &ApprovalRequest) -> Result<()> {
        let item = request.active_work_item().ok_or_else(|| {
            ApprovalError::Validation(format!("request {} has no active step", request.request_id))
        })?;
        DispatchQueue::submit(self, item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(request: i64, approver: i64, step: u32) -> WorkItem {
        WorkItem {
            request_id: RequestId::new(request),
            title: format!("Request {}", request),
            content: String::new(),
            approver_id: EmployeeId::new(approver),
            step_number: step,
        }
    }

    #[test]
    fn test_unknown_approver_has_empty_queue() {
        let queue = DispatchQueue::new();
        assert!(queue.get(EmployeeId::new(404)).is_empty());
        assert!(queue.take(EmployeeId::new(404), RequestId::new(1)).is_none());
    }

    #[test]
    fn test_queue_keeps_insertion_order() {
        let queue = DispatchQueue::new();
        queue.submit(item(3, 7, 1));
        queue.submit(item(1, 7, 2));
        queue.submit(item(2, 8, 1));

        let ids: Vec<i64> = queue
            .get(EmployeeId::new(7))
            .iter()
            .map(|i| i.request_id.value())
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_take_removes_first_match_only() {
        let queue = DispatchQueue::new();
        queue.submit(item(1, 7, 1));
        queue.submit(item(1, 7, 1));

        assert!(queue.take(EmployeeId::new(7), RequestId::new(1)).is_some());
        assert_eq!(queue.get(EmployeeId::new(7)).len(), 1);
        assert_eq!(queue.holders_of(RequestId::new(1)), vec![EmployeeId::new(7)]);
    }

    #[test]
    fn test_emptied_queue_is_dropped() {
        let queue = DispatchQueue::new();
        queue.submit(item(1, 7, 1));
        queue.submit(item(2, 8, 1));
        assert_eq!(queue.approver_count(), 2);

        queue.take(EmployeeId::new(7), RequestId::new(1)).unwrap();
        assert_eq!(queue.approver_count(), 1);
        assert!(queue.get(EmployeeId::new(7)).is_empty());

        // A later submission recreates the entry
        queue.submit(item(3, 7, 2));
        assert_eq!(queue.approver_count(), 2);
    }
}
