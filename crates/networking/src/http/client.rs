//! Fabula HTTP client with Telegram init-data authentication

use fabula_core::{
    AgentsResponse, CaseOpenRequest, CaseOpenResponse, CasesResponse, ChatHistoryPage, ChatStatus,
    DailyRewardClaim, DailyRewardInfo, DailyRewardStatus, DeductRequest, DeductResponse, Error,
    InvoiceRequest, InvoiceResponse, MeResponse, ProductsResponse, QuestActionRequest,
    QuestCheckResponse, QuestsResponse, Result, SendMessageResponse, StarsLinkRequest,
    StarsLinkResponse, StarsPackagesResponse, UserProfile,
};
use fabula_persistence::cache::CaseCache;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT},
    Client, Response,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

const API_BASE: &str = "https://fabula.gg/api";
const USER_AGENT_VALUE: &str = "FabulaDesktop/0.4";

/// HTTP client for interacting with the Fabula API
///
/// Authenticates every request with the `tma` scheme the backend
/// expects from mini-app clients. Optionally uses an in-memory
/// cache for the case list to reduce API calls.
pub struct FabulaClient {
    http: Client,
    init_data: String,
    /// Optional shared case cache (shared across all clients)
    cache: Option<Arc<CaseCache>>,
}

impl FabulaClient {
    /// Create a new client with the given Telegram init data
    ///
    /// # Arguments
    /// * `init_data` - The signed `window.Telegram.WebApp.initData` string
    pub fn new(init_data: &str) -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            init_data: init_data.to_string(),
            cache: None,
        }
    }

    /// Create a new client with a shared case cache
    pub fn new_with_cache(init_data: &str, cache: Arc<CaseCache>) -> Self {
        let mut client = Self::new(init_data);
        client.cache = Some(cache);
        client
    }

    /// Get default headers for requests
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );

        // Telegram mini-app auth scheme: "tma <init-data>"
        if let Ok(value) = HeaderValue::from_str(&format!("tma {}", self.init_data)) {
            headers.insert(AUTHORIZATION, value);
        }

        headers
    }

    /// Check if response indicates authentication failure
    fn check_auth_error(response: &Response) -> Option<Error> {
        match response.status().as_u16() {
            401 => Some(Error::TokenExpired),
            403 => Some(Error::AuthError("Access forbidden".to_string())),
            _ => None,
        }
    }

    /// Verify the init data is still accepted by fetching the profile
    #[instrument(skip(self))]
    pub async fn verify_auth(&self) -> Result<UserProfile> {
        debug!("Verifying authentication via /user/me");
        self.get_me().await
    }

    /// Get the current user's profile from `GET /api/user/me`
    #[instrument(skip(self))]
    pub async fn get_me(&self) -> Result<UserProfile> {
        let url = format!("{}/user/me", API_BASE);

        debug!("Fetching profile from: {}", url);

        let response = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        debug!("Response status: {}", response.status());

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let response = response.error_for_status().map_err(|e| {
            error!("Profile request failed: {}", e);
            Error::ApiError(e.to_string())
        })?;

        let me: MeResponse = response.json().await.map_err(|e| {
            error!("Failed to parse profile response: {}", e);
            Error::InvalidData(e.to_string())
        })?;

        let profile = me.into_user_profile();
        debug!("Profile fetched for user: {}", profile.username);
        Ok(profile)
    }

    /// Get the public agent roster
    #[instrument(skip(self))]
    pub async fn get_public_agents(&self) -> Result<AgentsResponse> {
        let url = format!("{}/agent/public/all", API_BASE);

        let response = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let response = response.error_for_status().map_err(|e| {
            error!("Agents request failed: {}", e);
            Error::ApiError(e.to_string())
        })?;

        let agents: AgentsResponse = response.json().await.map_err(|e| {
            error!("Failed to parse agents response: {}", e);
            Error::InvalidData(e.to_string())
        })?;

        debug!("Fetched {} agents", agents.agents.len());
        Ok(agents)
    }

    /// Send a chat message to the active agent
    #[instrument(skip(self, text))]
    pub async fn send_message(&self, text: &str) -> Result<SendMessageResponse> {
        let url = format!("{}/message/", API_BASE);

        debug!("Sending chat message ({} chars)", text.chars().count());

        let body = serde_json::json!({ "message": text });

        let response = self
            .http
            .post(&url)
            .headers(self.default_headers())
            .json(&body)
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            error!("Send message failed: HTTP {} - {}", status, body);
            return Err(Error::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let sent: SendMessageResponse = response.json().await.map_err(|e| {
            error!("Failed to parse send response: {}", e);
            Error::InvalidData(e.to_string())
        })?;

        debug!("Message sent, energy left: {}", sent.energy);
        Ok(sent)
    }

    /// Get a page of chat history, newest first
    ///
    /// Pass the cursor from the previous page to continue backwards.
    #[instrument(skip(self))]
    pub async fn get_chat_history(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<ChatHistoryPage> {
        let mut url = format!("{}/message/history?limit={}", API_BASE, limit);
        if let Some(c) = cursor {
            url.push_str(&format!("&cursor={}", c));
        }

        debug!("Fetching chat history from: {}", url);

        let response = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let response = response.error_for_status().map_err(|e| {
            error!("History request failed: {}", e);
            Error::ApiError(e.to_string())
        })?;

        let page: ChatHistoryPage = response.json().await.map_err(|e| {
            error!("Failed to parse history response: {}", e);
            Error::InvalidData(e.to_string())
        })?;

        debug!(
            "History page fetched: {} messages, hasMore={}",
            page.items.len(),
            page.has_more
        );
        Ok(page)
    }

    /// Get chat availability (energy gate)
    #[instrument(skip(self))]
    pub async fn get_chat_status(&self) -> Result<ChatStatus> {
        let url = format!("{}/message/status", API_BASE);

        let response = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status: ChatStatus = response
            .error_for_status()
            .map_err(|e| {
                error!("Chat status request failed: {}", e);
                Error::ApiError(e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Failed to parse chat status response: {}", e);
                Error::InvalidData(e.to_string())
            })?;

        debug!(
            "Chat status: canSend={}, energy={}",
            status.can_send, status.energy
        );
        Ok(status)
    }

    /// Check daily reward claim status
    #[instrument(skip(self))]
    pub async fn check_daily_reward(&self) -> Result<DailyRewardStatus> {
        let url = format!("{}/dailyReward/check", API_BASE);

        debug!("Checking daily reward status");

        let response = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status: DailyRewardStatus = response
            .error_for_status()
            .map_err(|e| {
                error!("Reward status request failed: {}", e);
                Error::ApiError(e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Failed to parse reward status response: {}", e);
                Error::InvalidData(e.to_string())
            })?;

        debug!(
            "Reward status: canClaim={}, timeRemaining={}ms ({}s)",
            status.can_claim,
            status.time_remaining,
            status.time_remaining / 1000
        );
        Ok(status)
    }

    /// Get the daily reward ladder
    #[instrument(skip(self))]
    pub async fn get_daily_reward(&self) -> Result<DailyRewardInfo> {
        let url = format!("{}/dailyReward/get", API_BASE);

        let response = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let info: DailyRewardInfo = response
            .error_for_status()
            .map_err(|e| {
                error!("Reward info request failed: {}", e);
                Error::ApiError(e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Failed to parse reward info response: {}", e);
                Error::InvalidData(e.to_string())
            })?;

        Ok(info)
    }

    /// Claim the daily reward
    #[instrument(skip(self))]
    pub async fn claim_daily_reward(&self) -> Result<DailyRewardClaim> {
        let url = format!("{}/dailyReward/claim", API_BASE);

        debug!("Claiming daily reward");

        let response = self
            .http
            .post(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let claim: DailyRewardClaim = response
            .error_for_status()
            .map_err(|e| {
                error!("Claim request failed: {}", e);
                Error::ApiError(e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Failed to parse claim response: {}", e);
                Error::InvalidData(e.to_string())
            })?;

        debug!("Daily reward claimed: {} stars", claim.reward_amount);
        Ok(claim)
    }

    /// Get the user's reward cases (cache-aware)
    #[instrument(skip(self))]
    pub async fn get_cases(&self) -> Result<CasesResponse> {
        // Check cache first
        if let Some(ref cache) = self.cache {
            if let Some(cases) = cache.snapshot() {
                debug!("Case list served from cache");
                return Ok(CasesResponse { cases });
            }
        }

        let url = format!("{}/case/all", API_BASE);

        let response = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let response = response.error_for_status().map_err(|e| {
            error!("Cases request failed: {}", e);
            Error::ApiError(e.to_string())
        })?;

        let cases: CasesResponse = response.json().await.map_err(|e| {
            error!("Failed to parse cases response: {}", e);
            Error::InvalidData(e.to_string())
        })?;

        debug!("Fetched {} cases", cases.cases.len());

        // Store in cache
        if let Some(ref cache) = self.cache {
            cache.store(cases.cases.clone());
        }

        Ok(cases)
    }

    /// Open a case and learn what was inside
    #[instrument(skip(self))]
    pub async fn open_case(&self, case_id: &str) -> Result<CaseOpenResponse> {
        let url = format!("{}/case/open", API_BASE);

        debug!("Opening case {}", case_id);

        let request = CaseOpenRequest {
            case_id: case_id.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .headers(self.default_headers())
            .json(&request)
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            error!("Case open failed: HTTP {} - {}", status, body);
            return Err(Error::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let opened: CaseOpenResponse = response.json().await.map_err(|e| {
            error!("Failed to parse case open response: {}", e);
            Error::InvalidData(e.to_string())
        })?;

        if !opened.success {
            return Err(Error::ApiError("Case open was not successful".to_string()));
        }

        debug!(
            "Case opened: {:?} x{}, {} left",
            opened.reward.kind, opened.reward.amount, opened.remaining_count
        );

        // Invalidate cache (counts changed)
        if let Some(ref cache) = self.cache {
            cache.invalidate();
        }

        Ok(opened)
    }

    /// Get the in-app product catalog
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<ProductsResponse> {
        let url = format!("{}/product/all", API_BASE);

        let response = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let products: ProductsResponse = response
            .error_for_status()
            .map_err(|e| {
                error!("Products request failed: {}", e);
                Error::ApiError(e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Failed to parse products response: {}", e);
                Error::InvalidData(e.to_string())
            })?;

        debug!("Fetched {} products", products.products.len());
        Ok(products)
    }

    /// Generate a Telegram Stars invoice link for a product
    #[instrument(skip(self))]
    pub async fn generate_invoice(&self, product_id: &str) -> Result<InvoiceResponse> {
        let url = format!("{}/payment/generate-invoice", API_BASE);

        debug!("Generating invoice for product {}", product_id);

        let request = InvoiceRequest {
            product_id: product_id.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .headers(self.default_headers())
            .json(&request)
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let invoice: InvoiceResponse = response
            .error_for_status()
            .map_err(|e| {
                error!("Invoice request failed: {}", e);
                Error::ApiError(e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Failed to parse invoice response: {}", e);
                Error::InvalidData(e.to_string())
            })?;

        Ok(invoice)
    }

    /// Get the user's quest list
    #[instrument(skip(self))]
    pub async fn get_quests(&self) -> Result<QuestsResponse> {
        let url = format!("{}/quest/my-tasks", API_BASE);

        let response = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let quests: QuestsResponse = response
            .error_for_status()
            .map_err(|e| {
                error!("Quests request failed: {}", e);
                Error::ApiError(e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Failed to parse quests response: {}", e);
                Error::InvalidData(e.to_string())
            })?;

        debug!("Fetched {} quests", quests.tasks.len());
        Ok(quests)
    }

    /// Mark a self-reported quest as complete
    #[instrument(skip(self))]
    pub async fn complete_quest(&self, task_id: i64) -> Result<QuestCheckResponse> {
        self.post_quest_action("quest/complete", task_id).await
    }

    /// Verify a channel-subscription quest
    #[instrument(skip(self))]
    pub async fn check_subscription(&self, task_id: i64) -> Result<QuestCheckResponse> {
        self.post_quest_action("quest/check-subscription", task_id)
            .await
    }

    /// Verify a referral-count quest
    #[instrument(skip(self))]
    pub async fn check_referrals(&self, task_id: i64) -> Result<QuestCheckResponse> {
        self.post_quest_action("quest/check-referrals", task_id)
            .await
    }

    /// Verify a channel-boost quest
    #[instrument(skip(self))]
    pub async fn check_boost(&self, task_id: i64) -> Result<QuestCheckResponse> {
        self.post_quest_action("quest/check-boost", task_id).await
    }

    async fn post_quest_action(&self, path: &str, task_id: i64) -> Result<QuestCheckResponse> {
        let url = format!("{}/{}", API_BASE, path);

        debug!("Posting quest action {} for task {}", path, task_id);

        let request = QuestActionRequest { task_id };

        let response = self
            .http
            .post(&url)
            .headers(self.default_headers())
            .json(&request)
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let result: QuestCheckResponse = response
            .error_for_status()
            .map_err(|e| {
                error!("Quest action {} failed: {}", path, e);
                Error::ApiError(e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Failed to parse quest action response: {}", e);
                Error::InvalidData(e.to_string())
            })?;

        debug!(
            "Quest action {}: completed={}, reward={}",
            path, result.completed, result.reward
        );
        Ok(result)
    }

    /// Get purchasable Stars bundles
    #[instrument(skip(self))]
    pub async fn get_star_packages(&self) -> Result<StarsPackagesResponse> {
        let url = format!("{}/payment/packages", API_BASE);

        let response = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let packages: StarsPackagesResponse = response
            .error_for_status()
            .map_err(|e| {
                error!("Packages request failed: {}", e);
                Error::ApiError(e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Failed to parse packages response: {}", e);
                Error::InvalidData(e.to_string())
            })?;

        Ok(packages)
    }

    /// Create a payment link for a Stars bundle
    #[instrument(skip(self))]
    pub async fn create_stars_link(&self, package_id: &str) -> Result<StarsLinkResponse> {
        let url = format!("{}/payment/create-stars-link", API_BASE);

        debug!("Creating stars link for package {}", package_id);

        let request = StarsLinkRequest {
            package_id: package_id.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .headers(self.default_headers())
            .json(&request)
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let link: StarsLinkResponse = response
            .error_for_status()
            .map_err(|e| {
                error!("Stars link request failed: {}", e);
                Error::ApiError(e.to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Failed to parse stars link response: {}", e);
                Error::InvalidData(e.to_string())
            })?;

        Ok(link)
    }

    /// Spend stars from the user's balance
    #[instrument(skip(self))]
    pub async fn deduct_balance(&self, amount: i64) -> Result<DeductResponse> {
        let url = format!("{}/user/me/deduct", API_BASE);

        debug!("Deducting {} stars", amount);

        let request = DeductRequest { amount };

        let response = self
            .http
            .post(&url)
            .headers(self.default_headers())
            .json(&request)
            .send()
            .await?;

        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            error!("Deduct request failed: HTTP {} - {}", status, body);
            return Err(Error::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let deducted: DeductResponse = response.json().await.map_err(|e| {
            error!("Failed to parse deduct response: {}", e);
            Error::InvalidData(e.to_string())
        })?;

        if !deducted.success {
            return Err(Error::InsufficientBalance {
                required: amount,
                available: deducted.new_balance,
            });
        }

        debug!("Balance deducted, new balance: {}", deducted.new_balance);
        Ok(deducted)
    }

    /// Get the raw init data (for re-authentication checks)
    pub fn init_data(&self) -> &str {
        &self.init_data
    }

    /// Get a reference to the cache (if one is attached)
    pub fn cache(&self) -> Option<&Arc<CaseCache>> {
        self.cache.as_ref()
    }

    /// Drop the cached case list
    pub fn invalidate_cases(&self) {
        if let Some(ref cache) = self.cache {
            cache.invalidate();
        }
    }
}
