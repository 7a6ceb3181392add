use hopewell_status::invalid_argument;
use hopewell_status::Status;

pub trait ApiFrom<T>
where
    Self: Sized,
{
    fn api_from(value: T) -> Result<Self, Status>;
}

pub trait FromApi<A>
where
    Self: Sized,
{
    fn from_api(api: A) -> Result<Self, Status>;

    fn from_api_field(api: A, field_name: &str) -> Result<Self, Status> {
        Self::from_api(api)
            .map_err(|e| invalid_argument!("'{}' is invalid: {}", field_name, e.message()))
    }
}
