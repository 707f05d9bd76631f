#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartScan {
        scan_id: crate::OpId,
        request: crate::ScanRequest,
    },
    CancelScan { scan_id: crate::OpId },
    BuildIndex {
        build_id: crate::OpId,
        request: crate::IndexRequest,
    },
    CancelIndexBuild { build_id: crate::OpId },
}
