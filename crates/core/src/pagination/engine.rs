//! Connection-style pagination engine.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{PaginationError, PaginationResult, StorageResult};

use super::cursor::{decode_cursor, encode_cursor};

/// Default page number for offset pagination.
pub const DEFAULT_PAGE: u64 = 1;

/// Default page size for offset pagination.
pub const DEFAULT_PAGE_LIMIT: u64 = 15;

// =============================================================================
// Queryable Source
// =============================================================================

/// Narrow capability the engine needs from a backing store.
///
/// A source represents one concrete query (entity, filter, and ordering are
/// baked in by the adapter that builds it). The engine only asks it for an
/// offset-positioned slice and a total matching count.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// The row type this source yields.
    type Item: Send;

    /// Fetch results starting at `offset`, optionally bounded by `limit`.
    async fn fetch(&self, offset: u64, limit: Option<u64>) -> StorageResult<Vec<Self::Item>>;

    /// Count all results matching the source's query.
    async fn count(&self) -> StorageResult<u64>;
}

// =============================================================================
// Connection Types
// =============================================================================

/// A result paired with the cursor needed to resume after it.
#[derive(Debug, Clone, Serialize)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: String,
}

/// Position metadata for a page, derived entirely from result-set size,
/// offset, and total count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// A page of results with pagination metadata, in the edges/pageInfo shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub total_count: u64,
    pub page_info: PageInfo,
    pub edges: Vec<Edge<T>>,
}

// =============================================================================
// Pagination Arguments
// =============================================================================

/// Arguments for cursor pagination.
#[derive(Debug, Clone, Default)]
pub struct CursorArgs {
    /// How many results to load. `None` leaves the bound to the source.
    pub first: Option<u64>,
    /// An opaque cursor to resume after.
    pub after: Option<String>,
    /// Check the cursor still points at the current data (see
    /// [`paginate_cursor`] step 4).
    pub validate_cursor: bool,
}

/// Arguments for classic page/limit pagination.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageArgs {
    /// 1-based page number; defaults to [`DEFAULT_PAGE`].
    pub page: Option<u64>,
    /// Page size; defaults to [`DEFAULT_PAGE_LIMIT`].
    pub limit: Option<u64>,
}

/// A page of results from offset pagination.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    /// Number of pages in the full result set.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit)
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Classic offset/limit pagination.
///
/// Not cursor-based; included as an alternate entry point. Defaults to
/// page 1 / limit 15 when unspecified.
pub async fn paginate<S>(source: &S, args: PageArgs) -> PaginationResult<Page<S::Item>>
where
    S: PageSource,
{
    let page = args.page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = args.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
    let offset = (page - 1) * limit;

    let items = source.fetch(offset, Some(limit)).await?;
    let total = source.count().await?;

    Ok(Page {
        items,
        total,
        page,
        limit,
    })
}

/// Cursor pagination returning a Relay-style connection.
///
/// `type_name` is the entity type tag cursors are issued for, and
/// `cursor_key` extracts the configured cursor key field from a result.
///
/// Algorithm:
///
/// 1. Without `after`, start at offset 0.
/// 2. With `after`, decode it against `type_name` and use the embedded
///    running index as the query offset.
/// 3. Run the slice query and the full count (two independent reads; the
///    engine takes no transaction, so they are not snapshot-consistent
///    with each other - an accepted race for a best-effort listing API).
/// 4. If `validate_cursor` was requested and a cursor was supplied, the
///    slice is extended one row backwards so the cursor's own row is
///    re-read as an anchor. The anchor's cursor key must still equal the
///    cursor's id; on mismatch the call aborts with
///    [`PaginationError::InvalidCursor`] rather than returning a silently
///    shifted page. The anchor row is not part of the returned page.
/// 5. Each result becomes an edge whose cursor continues the running
///    1-based index (`offset + position-in-page + 1`), so a client passing
///    the last edge's cursor resumes exactly after it.
/// 6. `has_next_page` is whether results remain past this page;
///    `has_prev_page` is whether the page started past offset 0.
///
/// The engine is stateless between calls and neither logs nor transforms
/// the errors it propagates.
pub async fn paginate_cursor<S, F>(
    source: &S,
    args: &CursorArgs,
    type_name: &str,
    cursor_key: F,
) -> PaginationResult<Connection<S::Item>>
where
    S: PageSource,
    F: Fn(&S::Item) -> String,
{
    let decoded = match &args.after {
        Some(after) => Some(decode_cursor(after, type_name)?),
        None => None,
    };
    let offset = decoded.as_ref().map_or(0, |cursor| cursor.index);

    let results = match &decoded {
        Some(cursor) if args.validate_cursor => {
            // The data may have shifted (insertions/deletions) since the
            // cursor was issued. Re-read the cursor's own row one offset
            // back and check it still carries the cursor's id. A guard,
            // not a repair: abort on mismatch.
            let anchor_offset = offset
                .checked_sub(1)
                .ok_or(PaginationError::InvalidCursor)?;
            let mut rows = source
                .fetch(anchor_offset, args.first.map(|n| n + 1))
                .await?;
            match rows.first() {
                Some(anchor) if cursor_key(anchor) == cursor.id => {}
                _ => return Err(PaginationError::InvalidCursor),
            }
            rows.remove(0);
            rows
        }
        _ => source.fetch(offset, args.first).await?,
    };
    let total_count = source.count().await?;

    let edges: Vec<Edge<S::Item>> = results
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let cursor = encode_cursor(&cursor_key(&node), type_name, offset + i as u64 + 1);
            Edge { node, cursor }
        })
        .collect();

    let page_info = PageInfo {
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
        has_next_page: offset + (edges.len() as u64) < total_count,
        has_prev_page: offset != 0,
    };

    Ok(Connection {
        total_count,
        page_info,
        edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory source over numbered rows, ordered by id.
    struct VecSource {
        ids: Vec<u64>,
    }

    impl VecSource {
        fn with_ids(range: std::ops::RangeInclusive<u64>) -> Self {
            Self {
                ids: range.collect(),
            }
        }
    }

    #[async_trait]
    impl PageSource for VecSource {
        type Item = u64;

        async fn fetch(&self, offset: u64, limit: Option<u64>) -> StorageResult<Vec<u64>> {
            let slice = self.ids.iter().copied().skip(offset as usize);
            Ok(match limit {
                Some(limit) => slice.take(limit as usize).collect(),
                None => slice.collect(),
            })
        }

        async fn count(&self) -> StorageResult<u64> {
            Ok(self.ids.len() as u64)
        }
    }

    fn first_page_args(first: u64) -> CursorArgs {
        CursorArgs {
            first: Some(first),
            after: None,
            validate_cursor: false,
        }
    }

    // Exemple du contrat: 5 lignes, first=2, pas de curseur
    #[tokio::test]
    async fn test_first_page() {
        let source = VecSource::with_ids(1..=5);
        let conn = paginate_cursor(&source, &first_page_args(2), "User", u64::to_string)
            .await
            .unwrap();

        assert_eq!(conn.total_count, 5);
        assert_eq!(
            conn.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            vec![1, 2]
        );
        // Les curseurs portent les index 1 et 2
        assert_eq!(
            decode_cursor(&conn.edges[0].cursor, "User").unwrap().index,
            1
        );
        assert_eq!(
            decode_cursor(&conn.edges[1].cursor, "User").unwrap().index,
            2
        );
        assert!(conn.page_info.has_next_page);
        assert!(!conn.page_info.has_prev_page);
        assert_eq!(conn.page_info.start_cursor, Some(conn.edges[0].cursor.clone()));
        assert_eq!(conn.page_info.end_cursor, Some(conn.edges[1].cursor.clone()));
    }

    // Test critique: reprendre avec endCursor donne la ligne suivante
    #[tokio::test]
    async fn test_resume_with_end_cursor() {
        let source = VecSource::with_ids(1..=5);
        let first = paginate_cursor(&source, &first_page_args(2), "User", u64::to_string)
            .await
            .unwrap();

        let args = CursorArgs {
            first: Some(2),
            after: first.page_info.end_cursor.clone(),
            validate_cursor: false,
        };
        let second = paginate_cursor(&source, &args, "User", u64::to_string)
            .await
            .unwrap();

        assert_eq!(
            second.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert!(second.page_info.has_next_page);
        assert!(second.page_info.has_prev_page);
        // L'index continue à travers les pages: 3 et 4
        assert_eq!(
            decode_cursor(&second.edges[0].cursor, "User").unwrap().index,
            3
        );
    }

    // L'index est un compteur global, pas dérivé de la taille de page:
    // changer `first` entre deux appels ne décale pas la reprise
    #[tokio::test]
    async fn test_resume_with_different_page_size() {
        let source = VecSource::with_ids(1..=10);
        let first = paginate_cursor(&source, &first_page_args(3), "User", u64::to_string)
            .await
            .unwrap();

        let args = CursorArgs {
            first: Some(5),
            after: first.page_info.end_cursor.clone(),
            validate_cursor: false,
        };
        let second = paginate_cursor(&source, &args, "User", u64::to_string)
            .await
            .unwrap();

        assert_eq!(
            second.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            vec![4, 5, 6, 7, 8]
        );
    }

    #[tokio::test]
    async fn test_last_page_has_no_next() {
        let source = VecSource::with_ids(1..=4);
        let first = paginate_cursor(&source, &first_page_args(2), "User", u64::to_string)
            .await
            .unwrap();
        let args = CursorArgs {
            first: Some(2),
            after: first.page_info.end_cursor.clone(),
            validate_cursor: false,
        };
        let second = paginate_cursor(&source, &args, "User", u64::to_string)
            .await
            .unwrap();

        assert_eq!(
            second.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert!(!second.page_info.has_next_page);
        assert!(second.page_info.has_prev_page);
    }

    #[tokio::test]
    async fn test_empty_result_set() {
        let source = VecSource { ids: vec![] };
        let conn = paginate_cursor(&source, &first_page_args(10), "User", u64::to_string)
            .await
            .unwrap();

        assert_eq!(conn.total_count, 0);
        assert!(conn.edges.is_empty());
        assert_eq!(conn.page_info.start_cursor, None);
        assert_eq!(conn.page_info.end_cursor, None);
        assert!(!conn.page_info.has_next_page);
        assert!(!conn.page_info.has_prev_page);
    }

    // Exemple du contrat: la ligne du curseur supprimée invalide la reprise
    // au lieu de renvoyer une page décalée
    #[tokio::test]
    async fn test_validate_cursor_detects_shifted_data() {
        let source = VecSource::with_ids(1..=5);
        let first = paginate_cursor(&source, &first_page_args(2), "User", u64::to_string)
            .await
            .unwrap();
        let after = first.page_info.end_cursor.clone();

        // La ligne 2 (celle du curseur) disparaît entre les deux appels
        let shifted = VecSource {
            ids: vec![1, 3, 4, 5],
        };
        let args = CursorArgs {
            first: Some(2),
            after,
            validate_cursor: true,
        };
        let result = paginate_cursor(&shifted, &args, "User", u64::to_string).await;
        assert!(matches!(result, Err(PaginationError::InvalidCursor)));
    }

    // Une suppression avant le curseur décale sa position: détectée aussi
    #[tokio::test]
    async fn test_validate_cursor_detects_deletion_before_cursor() {
        let source = VecSource::with_ids(1..=5);
        let first = paginate_cursor(&source, &first_page_args(2), "User", u64::to_string)
            .await
            .unwrap();
        let after = first.page_info.end_cursor.clone();

        let shifted = VecSource {
            ids: vec![2, 3, 4, 5],
        };
        let args = CursorArgs {
            first: Some(2),
            after,
            validate_cursor: true,
        };
        let result = paginate_cursor(&shifted, &args, "User", u64::to_string).await;
        assert!(matches!(result, Err(PaginationError::InvalidCursor)));
    }

    // Test critique: des données stables se reprennent normalement sous
    // validation - la ligne d'ancrage ne fait pas partie de la page
    #[tokio::test]
    async fn test_validate_cursor_accepts_stable_data() {
        let source = VecSource::with_ids(1..=5);
        let first = paginate_cursor(&source, &first_page_args(2), "User", u64::to_string)
            .await
            .unwrap();
        let args = CursorArgs {
            first: Some(2),
            after: first.page_info.end_cursor.clone(),
            validate_cursor: true,
        };
        let second = paginate_cursor(&source, &args, "User", u64::to_string)
            .await
            .unwrap();

        assert_eq!(
            second.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            vec![3, 4]
        );
        // Les index continuent comme sans validation
        assert_eq!(
            decode_cursor(&second.edges[0].cursor, "User").unwrap().index,
            3
        );
        assert!(second.page_info.has_next_page);
    }

    // Une suppression après le curseur ne casse pas la reprise: la page
    // suivante est simplement plus courte
    #[tokio::test]
    async fn test_validate_cursor_tolerates_deletion_after_cursor() {
        let source = VecSource::with_ids(1..=5);
        let first = paginate_cursor(&source, &first_page_args(2), "User", u64::to_string)
            .await
            .unwrap();
        let after = first.page_info.end_cursor.clone();

        let shifted = VecSource {
            ids: vec![1, 2, 4, 5],
        };
        let args = CursorArgs {
            first: Some(2),
            after,
            validate_cursor: true,
        };
        let second = paginate_cursor(&shifted, &args, "User", u64::to_string)
            .await
            .unwrap();
        assert_eq!(
            second.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            vec![4, 5]
        );
    }

    // Un curseur forgé avec l'index 0 n'a pas de ligne d'ancrage
    #[tokio::test]
    async fn test_validate_cursor_rejects_zero_index() {
        let source = VecSource::with_ids(1..=5);
        let args = CursorArgs {
            first: Some(2),
            after: Some(encode_cursor("0", "User", 0)),
            validate_cursor: true,
        };
        let result = paginate_cursor(&source, &args, "User", u64::to_string).await;
        assert!(matches!(result, Err(PaginationError::InvalidCursor)));
    }

    // Un curseur pointant après la fin des données + validation = invalide
    #[tokio::test]
    async fn test_validate_cursor_rejects_empty_page() {
        let source = VecSource::with_ids(1..=2);
        let args = CursorArgs {
            first: Some(2),
            after: Some(encode_cursor("5", "User", 5)),
            validate_cursor: true,
        };
        let result = paginate_cursor(&source, &args, "User", u64::to_string).await;
        assert!(matches!(result, Err(PaginationError::InvalidCursor)));
    }

    // Les erreurs du codec se propagent telles quelles depuis le moteur
    #[tokio::test]
    async fn test_type_mismatch_propagates() {
        let source = VecSource::with_ids(1..=5);
        let args = CursorArgs {
            first: Some(2),
            after: Some(encode_cursor("2", "UserMetadata", 2)),
            validate_cursor: false,
        };
        let result = paginate_cursor(&source, &args, "User", u64::to_string).await;
        assert!(matches!(
            result,
            Err(PaginationError::InvalidCursorType { .. })
        ));
    }

    #[tokio::test]
    async fn test_offset_pagination_defaults() {
        let source = VecSource::with_ids(1..=40);
        let page = paginate(&source, PageArgs::default()).await.unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 15);
        assert_eq!(page.items.len(), 15);
        assert_eq!(page.items[0], 1);
        assert_eq!(page.total, 40);
        assert_eq!(page.total_pages(), 3);
    }

    #[tokio::test]
    async fn test_offset_pagination_second_page() {
        let source = VecSource::with_ids(1..=40);
        let args = PageArgs {
            page: Some(2),
            limit: Some(10),
        };
        let page = paginate(&source, args).await.unwrap();

        assert_eq!(page.items[0], 11);
        assert_eq!(page.items.len(), 10);
    }

    // La forme JSON du Connection suit le contrat de l'appelant
    #[tokio::test]
    async fn test_connection_json_shape() {
        let source = VecSource::with_ids(1..=2);
        let conn = paginate_cursor(&source, &first_page_args(2), "User", u64::to_string)
            .await
            .unwrap();

        let json = serde_json::to_value(&conn).unwrap();
        assert_eq!(json["totalCount"], 2);
        assert_eq!(json["pageInfo"]["hasNextPage"], false);
        assert_eq!(json["pageInfo"]["hasPrevPage"], false);
        assert!(json["pageInfo"]["startCursor"].is_string());
        assert!(json["pageInfo"]["endCursor"].is_string());
        assert_eq!(json["edges"][0]["node"], 1);
        assert!(json["edges"][0]["cursor"].is_string());
    }
}
