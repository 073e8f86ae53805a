//! Integration tests exercising the live channels against an in-process
//! WebSocket server.

mod control_flow_test;
mod live_channel_test;
mod panel_service_test;
