use axum::{Extension, Json};
use echarger_core::{SegmentInfo, Waypoint, SEGMENTS, WAYPOINTS};

use crate::middleware::RequestId;

use super::{ApiResponse, ResponseMeta};

pub(super) async fn list_segments(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<&'static [SegmentInfo]>> {
    Json(ApiResponse {
        data: &SEGMENTS,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn list_waypoints(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<&'static [Waypoint]>> {
    Json(ApiResponse {
        data: WAYPOINTS,
        meta: ResponseMeta::new(req_id.0),
    })
}
