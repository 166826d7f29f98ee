use common::{Page, PageRequest};
use sea_orm::{ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, Select};
use tracing::debug;

use crate::error::{Result, ServiceError};

/// Window a sorted select into a 1-indexed page.
///
/// Out-of-range pages (including `page = 0`) come back as an empty
/// page with `has_next = false`; with `strict` set they are an error
/// instead. Windowing is offset-based via SeaORM's paginator, so an
/// insert landing between two page fetches can shift rows across the
/// boundary; accepted and documented, not a correctness bug.
pub async fn paginate<C, E>(
    select: Select<E>,
    db: &C,
    req: &PageRequest,
) -> Result<Page<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync,
{
    let paginator = select.paginate(db, req.per_page);
    let totals = paginator.num_items_and_pages().await?;

    // Page 1 of an empty listing is a valid empty page even in strict
    // mode; only pages past a non-empty end are out of range.
    let out_of_range = req.page < 1 || (req.page > 1 && req.page > totals.number_of_pages);
    if out_of_range {
        if req.strict {
            return Err(ServiceError::PageOutOfRange {
                page: req.page,
                total_pages: totals.number_of_pages,
            });
        }
        debug!(page = req.page, total_pages = totals.number_of_pages, "out-of-range page clamped to empty");
        return Ok(Page::empty(req, totals.number_of_items, totals.number_of_pages));
    }
    if totals.number_of_pages == 0 {
        return Ok(Page::empty(req, 0, 0));
    }

    let items = paginator.fetch_page(req.page - 1).await?;
    Ok(Page::new(
        items,
        req,
        totals.number_of_items,
        totals.number_of_pages,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_user, seed_posts, setup_services};
    use model::entities::post;
    use sea_orm::QueryOrder;

    fn all_posts_sorted() -> Select<post::Entity> {
        post::Entity::find()
            .order_by_desc(post::Column::Timestamp)
            .order_by_desc(post::Column::Id)
    }

    #[tokio::test]
    async fn windows_cover_the_listing_without_gaps() {
        let (identity, _, _, posts) = setup_services().await;
        let bob = identity.create_user(new_user("bob")).await.unwrap();
        seed_posts(&posts, bob.id, 7).await;

        let db = posts.db();
        let mut seen = Vec::new();
        let mut page_no = 1;
        loop {
            let page = paginate(all_posts_sorted(), db, &PageRequest::new(page_no, 3))
                .await
                .unwrap();
            assert_eq!(page.total_items, 7);
            assert_eq!(page.total_pages, 3);
            seen.extend(page.items.iter().map(|p| p.id));
            if !page.has_next {
                break;
            }
            page_no = page.next_page.unwrap();
        }

        let full = paginate(all_posts_sorted(), db, &PageRequest::new(1, 100))
            .await
            .unwrap();
        let expected: Vec<i32> = full.items.iter().map(|p| p.id).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn out_of_range_page_is_empty_by_default() {
        let (identity, _, _, posts) = setup_services().await;
        let bob = identity.create_user(new_user("bob")).await.unwrap();
        seed_posts(&posts, bob.id, 2).await;

        let page = paginate(all_posts_sorted(), posts.db(), &PageRequest::new(9, 10))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert_eq!(page.total_items, 2);

        let zero = paginate(all_posts_sorted(), posts.db(), &PageRequest::new(0, 10))
            .await
            .unwrap();
        assert!(zero.items.is_empty());
        assert!(!zero.has_next);
    }

    #[tokio::test]
    async fn out_of_range_page_errors_in_strict_mode() {
        let (identity, _, _, posts) = setup_services().await;
        let bob = identity.create_user(new_user("bob")).await.unwrap();
        seed_posts(&posts, bob.id, 2).await;

        let err = paginate(
            all_posts_sorted(),
            posts.db(),
            &PageRequest::new(9, 10).strict(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::PageOutOfRange { page: 9, total_pages: 1 }
        ));
    }

    #[tokio::test]
    async fn page_one_of_empty_listing_is_valid_even_strict() {
        let (_, _, _, posts) = setup_services().await;

        let page = paginate(
            all_posts_sorted(),
            posts.db(),
            &PageRequest::new(1, 10).strict(),
        )
        .await
        .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }
}
