//! GraphQL client for the hosted tracker API.

use std::time::Duration;

use async_trait::async_trait;
use linctl_graph::model::{IssueRef, IssueRelation, IssueRelations, ScopedIssue};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::{match_project, match_team, ClientError, Project, RelationSource, Team};

/// Default GraphQL endpoint of the hosted service.
pub const DEFAULT_API_URL: &str = "https://api.linear.app/graphql";

/// Page size for team and project lookups.
const LOOKUP_PAGE_SIZE: usize = 250;

const ISSUE_RELATIONS_QUERY: &str = r"
query IssueRelations($id: String!) {
  issue(id: $id) {
    id identifier title state { name }
    relations { nodes { type relatedIssue { id identifier title state { name } } } }
    inverseRelations { nodes { type issue { id identifier title state { name } } } }
  }
}";

const TEAMS_QUERY: &str = r"
query Teams($first: Int!) {
  teams(first: $first) { nodes { id key name } }
}";

const TEAM_PROJECTS_QUERY: &str = r"
query TeamProjects($teamId: String!, $first: Int!) {
  team(id: $teamId) { projects(first: $first) { nodes { id name } } }
}";

const TEAM_ISSUES_QUERY: &str = r"
query TeamIssues($teamId: String!, $first: Int!) {
  team(id: $teamId) {
    issues(first: $first) {
      nodes {
        id identifier title state { name }
        project { id }
        relations { nodes { type relatedIssue { id identifier title state { name } } } }
      }
    }
  }
}";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StateNode {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IdNode {
    id: String,
}

#[derive(Debug, Deserialize)]
struct IssueNode {
    id: String,
    identifier: String,
    title: String,
    state: Option<StateNode>,
}

impl From<IssueNode> for IssueRef {
    fn from(node: IssueNode) -> Self {
        Self {
            id: node.id,
            identifier: node.identifier,
            title: node.title,
            state: node.state.map(|s| s.name),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationNode {
    #[serde(rename = "type")]
    kind: String,
    related_issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
struct InverseRelationNode {
    #[serde(rename = "type")]
    kind: String,
    issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueRelationsNode {
    id: String,
    identifier: String,
    title: String,
    state: Option<StateNode>,
    relations: Connection<RelationNode>,
    inverse_relations: Connection<InverseRelationNode>,
}

#[derive(Debug, Deserialize)]
struct IssueRelationsData {
    issue: Option<IssueRelationsNode>,
}

#[derive(Debug, Deserialize)]
struct TeamsData {
    teams: Connection<Team>,
}

#[derive(Debug, Deserialize)]
struct TeamProjectsNode {
    projects: Connection<Project>,
}

#[derive(Debug, Deserialize)]
struct TeamProjectsData {
    team: Option<TeamProjectsNode>,
}

#[derive(Debug, Deserialize)]
struct ScopedIssueNode {
    id: String,
    identifier: String,
    title: String,
    state: Option<StateNode>,
    project: Option<IdNode>,
    relations: Connection<RelationNode>,
}

#[derive(Debug, Deserialize)]
struct TeamIssuesNode {
    issues: Connection<ScopedIssueNode>,
}

#[derive(Debug, Deserialize)]
struct TeamIssuesData {
    team: Option<TeamIssuesNode>,
}

fn outgoing(relations: Connection<RelationNode>) -> Vec<IssueRelation> {
    relations
        .nodes
        .into_iter()
        .filter_map(|r| {
            r.related_issue
                .map(|related| IssueRelation::new(r.kind.into(), related.into()))
        })
        .collect()
}

impl From<IssueRelationsNode> for IssueRelations {
    fn from(node: IssueRelationsNode) -> Self {
        let inverse_relations = node
            .inverse_relations
            .nodes
            .into_iter()
            .filter_map(|r| r.issue.map(|other| IssueRelation::new(r.kind.into(), other.into())))
            .collect();

        Self {
            issue: IssueRef {
                id: node.id,
                identifier: node.identifier,
                title: node.title,
                state: node.state.map(|s| s.name),
            },
            relations: outgoing(node.relations),
            inverse_relations,
        }
    }
}

impl From<ScopedIssueNode> for ScopedIssue {
    fn from(node: ScopedIssueNode) -> Self {
        Self {
            issue: IssueRef {
                id: node.id,
                identifier: node.identifier,
                title: node.title,
                state: node.state.map(|s| s.name),
            },
            project_id: node.project.map(|p| p.id),
            relations: outgoing(node.relations),
        }
    }
}

/// Decode a GraphQL response body, surfacing its `errors` array.
fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let response: GraphQlResponse<T> = serde_json::from_str(body)?;

    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        return Err(ClientError::GraphQl(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    response
        .data
        .ok_or_else(|| ClientError::GraphQl(vec!["response contained no data".to_string()]))
}

// ============================================================================
// Client
// ============================================================================

/// Client for the tracker's GraphQL API.
#[derive(Debug, Clone)]
pub struct LinearClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl LinearClient {
    /// Create a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::MissingApiKey` when `api_key` is `None` or blank,
    /// and `ClientError::Http` if the HTTP client cannot be constructed.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ClientError::MissingApiKey)?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("linctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// The GraphQL endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn query<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ClientError> {
        tracing::debug!(operation, endpoint = %self.endpoint, "Sending GraphQL request");

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        decode_response(&body)
    }
}

#[async_trait]
impl RelationSource for LinearClient {
    async fn fetch_issue_relations(&self, key: &str) -> Result<IssueRelations, ClientError> {
        let data: IssueRelationsData = self
            .query("IssueRelations", ISSUE_RELATIONS_QUERY, json!({ "id": key }))
            .await?;

        data.issue.map(IssueRelations::from).ok_or_else(|| ClientError::NotFound {
            kind: "Issue",
            key: key.to_string(),
        })
    }

    async fn resolve_team(&self, key_or_name: &str) -> Result<Option<Team>, ClientError> {
        let data: TeamsData = self
            .query("Teams", TEAMS_QUERY, json!({ "first": LOOKUP_PAGE_SIZE }))
            .await?;

        Ok(match_team(&data.teams.nodes, key_or_name))
    }

    async fn resolve_project(
        &self,
        team: &Team,
        name_or_id: &str,
    ) -> Result<Option<Project>, ClientError> {
        let data: TeamProjectsData = self
            .query(
                "TeamProjects",
                TEAM_PROJECTS_QUERY,
                json!({ "teamId": team.id, "first": LOOKUP_PAGE_SIZE }),
            )
            .await?;

        let team_node = data.team.ok_or_else(|| ClientError::NotFound {
            kind: "Team",
            key: team.key.clone(),
        })?;

        Ok(match_project(&team_node.projects.nodes, name_or_id))
    }

    async fn fetch_team_issues(
        &self,
        team: &Team,
        limit: usize,
    ) -> Result<Vec<ScopedIssue>, ClientError> {
        let data: TeamIssuesData = self
            .query(
                "TeamIssues",
                TEAM_ISSUES_QUERY,
                json!({ "teamId": team.id, "first": limit }),
            )
            .await?;

        let team_node = data.team.ok_or_else(|| ClientError::NotFound {
            kind: "Team",
            key: team.key.clone(),
        })?;

        Ok(team_node
            .issues
            .nodes
            .into_iter()
            .map(ScopedIssue::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linctl_graph::model::RelationKind;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_new_requires_api_key() {
        let err = LinearClient::new(DEFAULT_API_URL, None, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ClientError::MissingApiKey));

        let err = LinearClient::new(DEFAULT_API_URL, Some("  ".into()), Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingApiKey));
    }

    #[test]
    fn test_new_with_api_key() {
        let client =
            LinearClient::new(DEFAULT_API_URL, Some("lin_api_x".into()), Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.endpoint(), DEFAULT_API_URL);
    }

    #[test]
    fn test_decode_issue_relations() {
        let body = r#"{
          "data": {
            "issue": {
              "id": "uuid-100", "identifier": "ENG-100", "title": "Root",
              "state": { "name": "In Progress" },
              "relations": { "nodes": [
                { "type": "blocks", "relatedIssue": { "id": "uuid-101", "identifier": "ENG-101", "title": "Next", "state": { "name": "Todo" } } },
                { "type": "related", "relatedIssue": { "id": "uuid-5", "identifier": "ENG-5", "title": "Aside", "state": null } },
                { "type": "blocks", "relatedIssue": null }
              ] },
              "inverseRelations": { "nodes": [
                { "type": "blocks", "issue": { "id": "uuid-99", "identifier": "ENG-099", "title": "Before", "state": { "name": "Done" } } }
              ] }
            }
          }
        }"#;

        let data: IssueRelationsData = decode_response(body).unwrap();
        let record = IssueRelations::from(data.issue.unwrap());

        assert_eq!(record.issue.identifier, "ENG-100");
        assert_eq!(record.issue.state.as_deref(), Some("In Progress"));
        assert_eq!(record.relations.len(), 2);
        assert_eq!(record.relations[0].kind, RelationKind::Blocks);
        assert_eq!(record.relations[0].related.identifier, "ENG-101");
        assert_eq!(record.relations[1].kind, RelationKind::Related);
        assert_eq!(record.relations[1].related.state, None);
        assert_eq!(record.inverse_relations.len(), 1);
        assert_eq!(record.inverse_relations[0].related.identifier, "ENG-099");
    }

    #[test]
    fn test_decode_missing_issue() {
        let data: IssueRelationsData = decode_response(r#"{"data":{"issue":null}}"#).unwrap();
        assert!(data.issue.is_none());
    }

    #[test]
    fn test_decode_team_issues_with_projects() {
        let body = r#"{
          "data": { "team": { "issues": { "nodes": [
            { "id": "u1", "identifier": "ENG-1", "title": "One", "state": { "name": "Todo" },
              "project": { "id": "p1" },
              "relations": { "nodes": [ { "type": "blocks", "relatedIssue": { "id": "u2", "identifier": "ENG-2", "title": "Two", "state": { "name": "Todo" } } } ] } },
            { "id": "u2", "identifier": "ENG-2", "title": "Two", "state": { "name": "Todo" },
              "project": null,
              "relations": { "nodes": [] } }
          ] } } }
        }"#;

        let data: TeamIssuesData = decode_response(body).unwrap();
        let issues: Vec<ScopedIssue> = data
            .team
            .unwrap()
            .issues
            .nodes
            .into_iter()
            .map(ScopedIssue::from)
            .collect();

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].project_id.as_deref(), Some("p1"));
        assert_eq!(issues[0].relations[0].related.identifier, "ENG-2");
        assert_eq!(issues[1].project_id, None);
    }

    #[test]
    fn test_decode_teams_and_projects() {
        let teams: TeamsData = decode_response(
            r#"{"data":{"teams":{"nodes":[{"id":"t1","key":"ENG","name":"Engineering"}]}}}"#,
        )
        .unwrap();
        assert_eq!(match_team(&teams.teams.nodes, "engineering").unwrap().key, "ENG");

        let projects: TeamProjectsData = decode_response(
            r#"{"data":{"team":{"projects":{"nodes":[{"id":"p1","name":"Auth"}]}}}}"#,
        )
        .unwrap();
        let projects = projects.team.unwrap().projects.nodes;
        assert_eq!(match_project(&projects, "auth").unwrap().id, "p1");
    }

    #[test]
    fn test_decode_graphql_errors() {
        let body = r#"{"data":null,"errors":[{"message":"Entity not found"},{"message":"Second"}]}"#;
        let err = decode_response::<TeamsData>(body).unwrap_err();
        match err {
            ClientError::GraphQl(messages) => {
                assert_eq!(messages, vec!["Entity not found", "Second"]);
            }
            other => panic!("Expected GraphQl error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_without_data_or_errors() {
        let err = decode_response::<TeamsData>("{}").unwrap_err();
        assert!(matches!(err, ClientError::GraphQl(_)));
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = decode_response::<TeamsData>("not json").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    // ========== HTTP round trips ==========

    const TEST_API_KEY: &str = "lin_api_test";

    fn client_for(server: &MockServer) -> LinearClient {
        LinearClient::new(
            format!("{}/graphql", server.uri()),
            Some(TEST_API_KEY.to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn engineering() -> Team {
        Team {
            id: "t1".to_string(),
            key: "ENG".to_string(),
            name: "Engineering".to_string(),
        }
    }

    #[tokio::test]
    async fn test_team_issues_request_carries_key_and_variables() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", TEST_API_KEY))
            .and(body_partial_json(json!({
                "variables": { "teamId": "t1", "first": 250 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "team": { "issues": { "nodes": [
                    { "id": "u1", "identifier": "ENG-1", "title": "One",
                      "state": { "name": "Todo" }, "project": { "id": "p1" },
                      "relations": { "nodes": [] } }
                ] } } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let issues = client_for(&server)
            .fetch_team_issues(&engineering(), 250)
            .await
            .unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue.identifier, "ENG-1");
        assert_eq!(issues[0].project_id.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_issue_request_sends_key_as_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", TEST_API_KEY))
            .and(body_partial_json(json!({ "variables": { "id": "ENG-100" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "issue": {
                    "id": "u100", "identifier": "ENG-100", "title": "Root",
                    "state": { "name": "Todo" },
                    "relations": { "nodes": [] },
                    "inverseRelations": { "nodes": [] }
                } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = client_for(&server).fetch_issue_relations("ENG-100").await.unwrap();
        assert_eq!(record.issue.title, "Root");
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve_team("ENG").await.unwrap_err();
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream down");
            }
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_null_issue_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "issue": null } })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_issue_relations("ENG-404").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::NotFound { kind: "Issue", ref key } if key == "ENG-404"
        ));
    }

    #[tokio::test]
    async fn test_null_team_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "team": null } })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_team_issues(&engineering(), 250)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound { kind: "Team", .. }));
    }

    #[tokio::test]
    async fn test_graphql_errors_in_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [ { "message": "Authentication required" } ]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve_team("ENG").await.unwrap_err();
        assert_eq!(err.to_string(), "GraphQL error: Authentication required");
    }
}
