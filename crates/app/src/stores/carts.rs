//! Cart Store

use std::sync::Arc;

use rusty_money::{Money, MoneyError, iso::Currency};
use sharedcart::{
    browse::{self, ItemFilter, SortOrder},
    budget::BudgetStatus,
    cart::{Cart, CartError, QuantityUpdate},
    items::{CartItem, CartItemUuid, NewCartItem},
    members::{Member, MemberUuid},
    splits::{SplitError, SplitOutcome, SplitPolicy, calculate_split},
};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::clock::Clock;

/// Owns the shared cart and publishes a new snapshot after every change.
#[derive(Debug)]
pub struct CartStore {
    cart: watch::Sender<Arc<Cart>>,
    clock: Arc<dyn Clock>,
}

impl CartStore {
    /// Wrap `cart`, stamping new items with times from `clock`.
    pub fn new(cart: Cart, clock: Arc<dyn Clock>) -> Self {
        let (cart, _rx) = watch::channel(Arc::new(cart));

        Self { cart, clock }
    }

    /// The current cart. Later mutations never alter a returned snapshot.
    pub fn snapshot(&self) -> Arc<Cart> {
        Arc::clone(&self.cart.borrow())
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.cart.subscribe()
    }

    /// Add an item on behalf of `member`.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the item or member is rejected; the cart is
    /// left unchanged.
    #[tracing::instrument(
        name = "carts.store.add_item",
        skip(self, draft),
        fields(member = %member, item_name = %draft.name, quantity = draft.quantity),
        err
    )]
    pub fn add_item(
        &self,
        draft: NewCartItem,
        member: MemberUuid,
    ) -> Result<CartItemUuid, CartError> {
        let added_at = self.clock.now();
        let uuid = self.apply(
            |cart| cart.add_item(draft.clone(), member, added_at),
            Result::is_ok,
        )?;

        info!(item = %uuid, "added item");

        Ok(uuid)
    }

    /// Record `member` as another adder of an existing item.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownMember`] if the member is not on the roster.
    #[tracing::instrument(name = "carts.store.co_add_item", skip(self), err)]
    pub fn co_add_item(
        &self,
        item: CartItemUuid,
        member: MemberUuid,
    ) -> Result<bool, CartError> {
        self.apply(
            |cart| cart.co_add_item(item, member),
            |result| result.as_ref().is_ok_and(|added| *added),
        )
    }

    /// Remove an item. Unknown ids are a no-op and publish nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the total could not be updated.
    #[tracing::instrument(name = "carts.store.remove_item", skip(self), err)]
    pub fn remove_item(&self, item: CartItemUuid) -> Result<Option<CartItem>, CartError> {
        let removed = self.apply(
            |cart| cart.remove_item(item),
            |result| result.as_ref().is_ok_and(Option::is_some),
        )?;

        if removed.is_none() {
            debug!("item not in cart");
        }

        Ok(removed)
    }

    /// Set an item's quantity; zero or below removes it.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the quantity is out of range or the total
    /// could not be updated.
    #[tracing::instrument(name = "carts.store.update_quantity", skip(self), err)]
    pub fn update_quantity(
        &self,
        item: CartItemUuid,
        quantity: i64,
    ) -> Result<QuantityUpdate, CartError> {
        self.apply(
            |cart| cart.update_quantity(item, quantity),
            |result| {
                result
                    .as_ref()
                    .is_ok_and(|update| !matches!(update, QuantityUpdate::Missing))
            },
        )
    }

    /// Replace or clear the budget.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] for a non-positive budget or one in another currency.
    #[tracing::instrument(
        name = "carts.store.update_budget",
        skip(self, budget),
        fields(budget = budget.as_ref().map(Money::to_minor_units)),
        err
    )]
    pub fn update_budget(
        &self,
        budget: Option<Money<'static, Currency>>,
    ) -> Result<(), CartError> {
        self.apply(|cart| cart.update_budget(budget), Result::is_ok)
    }

    /// Add a member to the roster. Returns `false` if they were already on it.
    #[tracing::instrument(
        name = "carts.store.add_member",
        skip(self, member),
        fields(member = %member.uuid())
    )]
    pub fn add_member(&self, member: Member) -> bool {
        self.apply(|cart| cart.add_member(member.clone()), |joined| *joined)
    }

    /// Split the current total under `policy`.
    ///
    /// # Errors
    ///
    /// Returns a [`SplitError`] if the arithmetic overflows.
    pub fn split(&self, policy: &SplitPolicy) -> Result<SplitOutcome, SplitError> {
        calculate_split(&self.snapshot(), policy)
    }

    /// Budget status of the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if budget and total disagree on currency.
    pub fn budget_status(&self) -> Result<Option<BudgetStatus>, MoneyError> {
        BudgetStatus::for_cart(&self.snapshot())
    }

    /// Filtered, sorted copies of the current items.
    pub fn browse(&self, filter: &ItemFilter, sort: SortOrder) -> Vec<CartItem> {
        browse::browse(self.snapshot().items(), filter, sort)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Runs `operation` against a copy of the current cart and publishes the
    /// copy if `changed` accepts the outcome. A copy taken from a snapshot that
    /// another writer has since replaced is discarded and the operation rerun.
    fn apply<T>(
        &self,
        mut operation: impl FnMut(&mut Cart) -> T,
        changed: impl Fn(&T) -> bool,
    ) -> T {
        loop {
            let base = self.snapshot();
            let mut next = Cart::clone(&base);
            let outcome = operation(&mut next);

            if !changed(&outcome) {
                return outcome;
            }

            let published = self.cart.send_if_modified(|current| {
                if !Arc::ptr_eq(current, &base) {
                    return false;
                }

                *current = Arc::new(next);

                true
            });

            if published {
                return outcome;
            }

            debug!("cart replaced by a concurrent writer, retrying");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use jiff::Timestamp;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;
    use crate::clock::FixedClock;

    struct Fixture {
        store: CartStore,
        john: MemberUuid,
        jane: MemberUuid,
    }

    fn fixture() -> Fixture {
        let john = Member::new("John Doe", "john@example.com", "");
        let jane = Member::new("Jane Smith", "jane@example.com", "");
        let (john_uuid, jane_uuid) = (john.uuid(), jane.uuid());

        let mut cart = Cart::new("Family Grocery List", john, USD, Timestamp::UNIX_EPOCH);
        cart.add_member(jane);

        Fixture {
            store: CartStore::new(cart, Arc::new(FixedClock(Timestamp::UNIX_EPOCH))),
            john: john_uuid,
            jane: jane_uuid,
        }
    }

    fn bananas() -> NewCartItem {
        NewCartItem::new("Organic Bananas", Money::from_minor(399, USD), 2, "Fruits")
    }

    #[test]
    fn snapshots_are_not_altered_by_later_mutations() -> TestResult {
        let Fixture { store, john, .. } = fixture();

        let before = store.snapshot();
        let item = store.add_item(bananas(), john)?;
        let after = store.snapshot();

        assert!(before.is_empty());
        assert_eq!(*before.total_spent(), Money::from_minor(0, USD));
        assert_eq!(after.item(item).map(CartItem::quantity), Some(2));

        store.update_quantity(item, 5)?;

        assert_eq!(after.item(item).map(CartItem::quantity), Some(2));
        assert_eq!(*store.snapshot().total_spent(), Money::from_minor(1995, USD));

        Ok(())
    }

    #[test]
    fn failed_mutations_publish_nothing() -> TestResult {
        let Fixture { store, john, .. } = fixture();
        let mut rx = store.subscribe();

        let result = store.add_item(
            NewCartItem::new("", Money::from_minor(399, USD), 1, "Fruits"),
            john,
        );

        assert!(result.is_err());
        assert!(!rx.has_changed()?);

        let result = store.add_item(bananas(), MemberUuid::new());

        assert!(matches!(result, Err(CartError::UnknownMember(_))));
        assert!(!rx.has_changed()?);

        Ok(())
    }

    #[test]
    fn successful_mutations_notify_subscribers() -> TestResult {
        let Fixture { store, jane, .. } = fixture();
        let mut rx = store.subscribe();

        store.add_item(bananas(), jane)?;

        assert!(rx.has_changed()?);
        assert_eq!(rx.borrow_and_update().len(), 1);

        Ok(())
    }

    #[test]
    fn removing_unknown_item_publishes_nothing() -> TestResult {
        let Fixture { store, .. } = fixture();
        let mut rx = store.subscribe();

        assert_eq!(store.remove_item(CartItemUuid::new())?, None);
        assert_eq!(
            store.update_quantity(CartItemUuid::new(), 3)?,
            QuantityUpdate::Missing
        );
        assert!(!rx.has_changed()?);

        Ok(())
    }

    #[test]
    fn quantity_zero_removes_item() -> TestResult {
        let Fixture { store, john, .. } = fixture();

        let item = store.add_item(bananas(), john)?;
        let update = store.update_quantity(item, 0)?;

        assert!(matches!(update, QuantityUpdate::Removed(removed) if removed.uuid() == item));
        assert!(store.snapshot().is_empty());
        assert_eq!(*store.snapshot().total_spent(), Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn items_are_stamped_by_the_clock() -> TestResult {
        let Fixture { store, john, .. } = fixture();

        let item = store.add_item(bananas(), john)?;

        assert_eq!(
            store.snapshot().item(item).map(CartItem::created_at),
            Some(Timestamp::UNIX_EPOCH)
        );

        Ok(())
    }

    #[test]
    fn split_reads_current_snapshot() -> TestResult {
        let Fixture { store, john, jane } = fixture();

        let item = store.add_item(
            NewCartItem::new("Whole Milk", Money::from_minor(429, USD), 1, "Dairy"),
            john,
        )?;
        store.co_add_item(item, jane)?;

        let outcome = store.split(&SplitPolicy::ItemBased)?;

        assert_eq!(outcome.amount_for(jane), outcome.amount_for(john));

        Ok(())
    }

    #[test]
    fn budget_status_follows_updates() -> TestResult {
        let Fixture { store, john, .. } = fixture();

        assert_eq!(store.budget_status()?, None);

        store.update_budget(Some(Money::from_minor(5_00, USD)))?;
        store.add_item(bananas(), john)?;

        let status = store.budget_status()?.ok_or("budget missing")?;

        assert!(status.is_over_budget());
        assert_eq!(status.overage(), Some(Money::from_minor(298, USD)));

        assert!(store.update_budget(Some(Money::from_minor(0, USD))).is_err());

        Ok(())
    }

    #[test]
    fn members_join_once() {
        let Fixture { store, .. } = fixture();
        let mike = Member::new("Mike Johnson", "mike@example.com", "");

        assert!(store.add_member(mike.clone()));
        assert!(!store.add_member(mike));
        assert_eq!(store.snapshot().members().len(), 3);
    }

    #[test]
    fn concurrent_adds_are_all_kept() -> TestResult {
        let Fixture { store, john, jane } = fixture();
        let price = Money::from_minor(1_00, USD);

        let results: Vec<Result<(), CartError>> = thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|worker| {
                    let store = &store;
                    let member = if worker % 2 == 0 { john } else { jane };

                    scope.spawn(move || {
                        (0..200).try_for_each(|_| {
                            let draft = NewCartItem::new("Gum", price, 1, "Snacks");

                            store.add_item(draft, member).map(|_uuid| ())
                        })
                    })
                })
                .collect();

            workers
                .into_iter()
                .map(|worker| worker.join())
                .collect::<Result<_, _>>()
        })
        .map_err(|_err| "worker panicked")?;

        for result in results {
            result?;
        }

        let cart = store.snapshot();

        assert_eq!(cart.len(), 1600);
        assert_eq!(*cart.total_spent(), Money::from_minor(1600_00, USD));

        Ok(())
    }
}
