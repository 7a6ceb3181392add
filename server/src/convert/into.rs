use crate::convert::from::{ApiFrom, FromApi};
use hopewell_status::Status;

pub trait IntoApi<A>
where
    A: Sized,
{
    fn into_api(self) -> Result<A, Status>;
}

impl<A, T> IntoApi<A> for T
where
    A: ApiFrom<T>,
{
    fn into_api(self) -> Result<A, Status> {
        A::api_from(self)
    }
}

pub trait ApiInto<T> {
    fn api_into(self) -> Result<T, Status>;
}

impl<A, T> ApiInto<T> for A
where
    T: FromApi<A>,
{
    fn api_into(self) -> Result<T, Status> {
        T::from_api(self)
    }
}
