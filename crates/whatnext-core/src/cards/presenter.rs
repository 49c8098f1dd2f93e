/// Shows the detail view of a card. Fire-and-forget from the stack's side.
pub trait DetailPresenter<T>: Send + Sync {
    fn present(&self, card: &T);
}

impl<T, F> DetailPresenter<T> for F
where
    F: Fn(&T) + Send + Sync,
{
    fn present(&self, card: &T) {
        self(card)
    }
}
