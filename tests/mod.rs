mod web_smoke;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - calendar_scenarios: Month grid, bucketing and navigation behaviour
// - smoke_tests: Configuration and the client/case/event record flow
// - store_mock: Record books against a store that fails on demand
// - web_smoke: HTTP routes driven through the router without a socket
