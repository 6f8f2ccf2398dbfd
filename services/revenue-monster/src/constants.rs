// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

// Env values used by the Revenue Monster client.
pub const REVENUE_MONSTER_CLIENT_ID: &str = "REVENUE_MONSTER_CLIENT_ID";
pub const REVENUE_MONSTER_CLIENT_SECRET: &str = "REVENUE_MONSTER_CLIENT_SECRET";
pub const REVENUE_MONSTER_PRIVATE_KEY: &str = "REVENUE_MONSTER_PRIVATE_KEY";
pub const REVENUE_MONSTER_PRIVATE_KEY_PATH: &str = "REVENUE_MONSTER_PRIVATE_KEY_PATH";
pub const REVENUE_MONSTER_PUBLIC_KEY: &str = "REVENUE_MONSTER_PUBLIC_KEY";
pub const REVENUE_MONSTER_STORE_ID: &str = "REVENUE_MONSTER_STORE_ID";
pub const REVENUE_MONSTER_SANDBOX: &str = "REVENUE_MONSTER_SANDBOX";
pub const REVENUE_MONSTER_OAUTH_ENDPOINT: &str = "REVENUE_MONSTER_OAUTH_ENDPOINT";
pub const REVENUE_MONSTER_OPEN_ENDPOINT: &str = "REVENUE_MONSTER_OPEN_ENDPOINT";

// Hosts.
pub const OAUTH_ENDPOINT: &str = "https://oauth.revenuemonster.my";
pub const OPEN_ENDPOINT: &str = "https://open.revenuemonster.my";
pub const SANDBOX_OAUTH_ENDPOINT: &str = "https://sb-oauth.revenuemonster.my";
pub const SANDBOX_OPEN_ENDPOINT: &str = "https://sb-open.revenuemonster.my";

// Headers.
pub const X_NONCE_STR: &str = "x-nonce-str";
pub const X_SIGNATURE: &str = "x-signature";
pub const X_TIMESTAMP: &str = "x-timestamp";

pub const CONTENT_TYPE_JSON: &str = "application/json";

// Span tags and fields.
pub const COMPONENT: &str = "paysign-revenue-monster";
pub const TAG_COMPONENT: &str = "component";
pub const TAG_HTTP_URL: &str = "http.url";
pub const TAG_HTTP_METHOD: &str = "http.method";
pub const TAG_HTTP_STATUS_CODE: &str = "http.status_code";
pub const FIELD_REQUEST_BODY: &str = "http.request.body";
pub const FIELD_RESPONSE_BODY: &str = "http.response.body";

/// `code` of a successful business response.
pub const RESPONSE_SUCCESS: &str = "SUCCESS";
